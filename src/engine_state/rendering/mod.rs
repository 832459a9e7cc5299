//! # Rendering Data
//!
//! Everything the engine produces for a renderer, without talking to a
//! graphics API:
//!
//! * `vertex` - The vertex records written into block and sign buffers
//! * `meshing` - The mesh compute engine and its shape and sign emitters

pub mod meshing;
pub mod vertex;
