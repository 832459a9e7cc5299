//! # Sign Text
//!
//! Lays sign text out as one textured quad per glyph, on the main thread, into
//! a chunk's separate sign buffer.
//!
//! ## Layout
//!
//! Text is word-wrapped at a fixed width and cut to five rows. Faces 0..=3
//! stand against a side of the voxel, faces 4..=7 lie on top of it facing one
//! of the four horizontal directions. Signs on slabs sink with the slab top.
//!
//! ## Markup
//!
//! * `\#rgb` and `\#rrggbb` switch the text color.
//! * A leading `\<number>` scales the font.
//!
//! Markup is consumed up to and including the following space.

use crate::engine_state::rendering::vertex::SignVertex;
use crate::engine_state::voxels::block::shape::Shape;
use crate::engine_state::voxels::chunk::signs::{Sign, SignList, SIGN_FACES};
use crate::engine_state::voxels::chunk::ChunkLayers;

/// Most rows drawn per sign.
pub const MAX_ROWS: usize = 5;
const MAX_WIDTH: f32 = 64.0;
const LINE_HEIGHT: f32 = 1.25;

const GLYPH_DX: [f32; 8] = [0.0, 0.0, -1.0, 1.0, 1.0, 0.0, -1.0, 0.0];
const GLYPH_DZ: [f32; 8] = [1.0, -1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 1.0];
const LINE_DX: [f32; 8] = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0];
const LINE_DY: [f32; 8] = [-1.0, -1.0, -1.0, -1.0, 0.0, 0.0, 0.0, 0.0];
const LINE_DZ: [f32; 8] = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0];

/// Push-out from the voxel center, in half blocks.
const FACE_OFFSETS: [[f32; 3]; 8] = [
    [-1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
];

/// Glyph quad corners per face, as two triangles.
const GLYPH_CORNERS: [[[f32; 3]; 6]; 8] = [
    [[0.0, -2.0, -1.0], [0.0, 2.0, 1.0], [0.0, 2.0, -1.0], [0.0, -2.0, -1.0], [0.0, -2.0, 1.0], [0.0, 2.0, 1.0]],
    [[0.0, -2.0, -1.0], [0.0, 2.0, 1.0], [0.0, -2.0, 1.0], [0.0, -2.0, -1.0], [0.0, 2.0, -1.0], [0.0, 2.0, 1.0]],
    [[-1.0, -2.0, 0.0], [1.0, 2.0, 0.0], [1.0, -2.0, 0.0], [-1.0, -2.0, 0.0], [-1.0, 2.0, 0.0], [1.0, 2.0, 0.0]],
    [[-1.0, -2.0, 0.0], [1.0, -2.0, 0.0], [1.0, 2.0, 0.0], [-1.0, -2.0, 0.0], [1.0, 2.0, 0.0], [-1.0, 2.0, 0.0]],
    [[-1.0, 0.0, 2.0], [1.0, 0.0, 2.0], [1.0, 0.0, -2.0], [-1.0, 0.0, 2.0], [1.0, 0.0, -2.0], [-1.0, 0.0, -2.0]],
    [[-2.0, 0.0, 1.0], [2.0, 0.0, -1.0], [-2.0, 0.0, -1.0], [-2.0, 0.0, 1.0], [2.0, 0.0, 1.0], [2.0, 0.0, -1.0]],
    [[1.0, 0.0, 2.0], [-1.0, 0.0, -2.0], [-1.0, 0.0, 2.0], [1.0, 0.0, 2.0], [1.0, 0.0, -2.0], [-1.0, 0.0, -2.0]],
    [[2.0, 0.0, -1.0], [-2.0, 0.0, 1.0], [2.0, 0.0, 1.0], [2.0, 0.0, -1.0], [-2.0, 0.0, -1.0], [-2.0, 0.0, 1.0]],
];

/// Which glyph cell edge (u, v) each quad corner maps to.
const GLYPH_UVS: [[[bool; 2]; 6]; 8] = [
    [[false, false], [true, true], [false, true], [false, false], [true, false], [true, true]],
    [[true, false], [false, true], [false, false], [true, false], [true, true], [false, true]],
    [[true, false], [false, true], [false, false], [true, false], [true, true], [false, true]],
    [[false, false], [true, false], [true, true], [false, false], [true, true], [false, true]],
    [[false, false], [true, false], [true, true], [false, false], [true, true], [false, true]],
    [[false, true], [true, false], [true, true], [false, true], [false, false], [true, false]],
    [[false, true], [true, false], [true, true], [false, true], [false, false], [true, false]],
    [[false, true], [true, false], [true, true], [false, true], [false, false], [true, false]],
];

/// Advance of every printable ASCII character, starting at the space.
const CHAR_WIDTHS: [u8; 96] = [
    4, 2, 4, 7, 6, 9, 7, 2, 3, 3, 4, 6, 3, 5, 2, 7, //
    6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 2, 3, 5, 6, 5, 7, //
    8, 6, 6, 6, 6, 6, 6, 6, 6, 4, 6, 6, 5, 8, 8, 6, //
    6, 7, 6, 6, 6, 6, 8, 10, 8, 6, 6, 3, 6, 3, 6, 6, //
    4, 7, 6, 6, 6, 6, 5, 6, 6, 2, 5, 5, 2, 9, 6, 6, //
    6, 6, 6, 5, 5, 6, 6, 8, 6, 6, 6, 4, 2, 4, 7, 0, //
];

/// Advance of one character. Characters outside printable ASCII take no room.
pub fn char_width(c: char) -> i32 {
    match c as u32 {
        code @ 32..=127 => i32::from(CHAR_WIDTHS[(code - 32) as usize]),
        _ => 0,
    }
}

/// Advance of a whole string.
pub fn string_width(text: &str) -> i32 {
    text.chars().map(char_width).sum()
}

/// Breaks text into rows no wider than `max_width`, keeping words whole.
///
/// Explicit line breaks always start a new row; a single word wider than the
/// limit gets a row of its own.
pub fn wrap(text: &str, max_width: f32) -> Vec<String> {
    let space = char_width(' ');
    let mut rows = Vec::new();
    for line in text.split(['\r', '\n']).filter(|l| !l.is_empty()) {
        let mut row = String::new();
        let mut width = 0;
        for word in line.split(' ').filter(|w| !w.is_empty()) {
            let word_width = string_width(word);
            if width > 0 {
                if (width + word_width) as f32 > max_width {
                    rows.push(std::mem::take(&mut row));
                    width = 0;
                } else {
                    row.push(' ');
                }
            }
            row.push_str(word);
            width += word_width + space;
        }
        rows.push(row);
    }
    rows
}

/// Parses `#rgb` or `#rrggbb`.
fn parse_color(markup: &str) -> Option<[f32; 3]> {
    let hex = markup.strip_prefix('#')?;
    let digits: Vec<u32> = hex.chars().map_while(|c| c.to_digit(16)).collect();
    match digits.len() {
        6.. => Some([
            (digits[0] * 16 + digits[1]) as f32 / 255.0,
            (digits[2] * 16 + digits[3]) as f32 / 255.0,
            (digits[4] * 16 + digits[5]) as f32 / 255.0,
        ]),
        3..=5 => Some([
            digits[0] as f32 / 15.0,
            digits[1] as f32 / 15.0,
            digits[2] as f32 / 15.0,
        ]),
        _ => None,
    }
}

/// Reads a leading `\<number>` font scale.
fn font_scale(text: &str) -> f32 {
    let Some(rest) = text.strip_prefix('\\') else {
        return 1.0;
    };
    let number: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match number.parse::<f32>() {
        Ok(scale) if scale > 0.0 => scale,
        _ => 1.0,
    }
}

fn push_glyph(
    out: &mut Vec<SignVertex>,
    center: [f32; 3],
    half: f32,
    face: usize,
    c: char,
    color: [f32; 3],
) {
    const CELL: f32 = 0.0625;
    let (pu, pv) = (CELL / 5.0, CELL / 2.5);
    let w = c as u32 - 32;
    let du = (w % 16) as f32 * CELL;
    let dv = 1.0 - (w / 16 + 1) as f32 * CELL * 2.0;
    let offset = FACE_OFFSETS[face];
    let origin = [
        center[0] + 0.5 * offset[0],
        center[1] + 0.5 * offset[1],
        center[2] + 0.5 * offset[2],
    ];
    for (corner, [u, v]) in GLYPH_CORNERS[face].iter().zip(GLYPH_UVS[face]) {
        out.push(SignVertex {
            position: [
                origin[0] + half * corner[0],
                origin[1] + half * corner[1],
                origin[2] + half * corner[2],
            ],
            uv: [
                du + if u { CELL - pu } else { pu },
                dv + if v { CELL * 2.0 - pv } else { pv },
            ],
            color,
        });
    }
}

/// Appends the glyph quads of one sign and returns how many were written.
///
/// `shape` is the shape of the voxel carrying the sign.
pub fn sign_vertices(sign: &Sign, shape: Shape, out: &mut Vec<SignVertex>) -> usize {
    if !(0..SIGN_FACES).contains(&sign.face) {
        return 0;
    }
    let face = sign.face as usize;
    let height = shape.height();
    let sink = if face <= 3 { 0.5 - height / 2.0 } else { 1.0 - height };

    let max_width = MAX_WIDTH / font_scale(&sign.text);
    let rows = wrap(&sign.text, max_width);
    let row_count = rows.len().min(MAX_ROWS);
    let (dx, dz) = (GLYPH_DX[face], GLYPH_DZ[face]);
    let (ldx, ldy, ldz) = (LINE_DX[face], LINE_DY[face], LINE_DZ[face]);
    let n = 1.0 / (max_width / 10.0);
    let spread = n * row_count.saturating_sub(1) as f32 * (LINE_HEIGHT / 2.0);
    let mut sx = sign.x as f32 - spread * ldx;
    let mut sy = sign.y as f32 - spread * ldy - sink;
    let mut sz = sign.z as f32 - spread * ldz;

    let mut color = [0.0; 3];
    let mut count = 0;
    for row in rows.iter().take(MAX_ROWS) {
        let mut remaining = (string_width(row) as f32).min(max_width);
        let mut rx = sx - dx * remaining / max_width / 2.0;
        let mut rz = sz - dz * remaining / max_width / 2.0;
        let chars: Vec<char> = row.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '\\' && i + 1 < chars.len() {
                let end = chars[i..]
                    .iter()
                    .position(|&c| c == ' ')
                    .map_or(chars.len(), |p| i + p);
                let markup: String = chars[i + 1..end].iter().collect();
                if let Some(parsed) = parse_color(&markup) {
                    color = parsed;
                }
                i = end + 1;
                continue;
            }
            let width = char_width(c) as f32;
            remaining -= width;
            if remaining < 0.0 {
                break;
            }
            rx += dx * width / max_width / 2.0;
            rz += dz * width / max_width / 2.0;
            if c != ' ' && char_width(c) > 0 {
                push_glyph(out, [rx, sy, rz], n / 2.0, face, c, color);
                count += 1;
            }
            rx += dx * width / max_width / 2.0;
            rz += dz * width / max_width / 2.0;
            i += 1;
        }
        sx += n * LINE_HEIGHT * ldx;
        sy += n * LINE_HEIGHT * ldy;
        sz += n * LINE_HEIGHT * ldz;
    }
    count
}

/// Sign geometry of a whole chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignMesh {
    /// Glyph vertices, six per glyph.
    pub vertices: Vec<SignVertex>,
    /// Number of glyph quads.
    pub faces: usize,
}

/// Lays out every sign of a chunk. Shapes come from the chunk's own layers.
pub fn sign_mesh(signs: &SignList, layers: &ChunkLayers) -> SignMesh {
    let mut mesh = SignMesh::default();
    for sign in signs.iter() {
        let shape = Shape::from_id(layers.shape.get(sign.x, sign.y, sign.z));
        mesh.faces += sign_vertices(sign, shape, &mut mesh.vertices);
    }
    mesh
}
