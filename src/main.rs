//! # Voxel World Demo Entry Point
//!
//! Runs the headless demo from the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    if let Err(err) = voxel_world::run() {
        eprintln!("voxel-world: {err}");
        std::process::exit(1);
    }
}
