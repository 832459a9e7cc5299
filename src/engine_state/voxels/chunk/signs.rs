//! Free text attached to voxel faces.

/// Sign faces 0..=3 stand on a side of the voxel, 4..=7 lie on top of it.
pub const SIGN_FACES: i32 = 8;

/// Text attached to one face of one voxel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sign {
    /// Voxel x.
    pub x: i32,
    /// Voxel y.
    pub y: i32,
    /// Voxel z.
    pub z: i32,
    /// Face index, `0..SIGN_FACES`.
    pub face: i32,
    /// The text, possibly with color markup.
    pub text: String,
}

/// A chunk's signs in insertion order. At most one sign per voxel face.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignList {
    signs: Vec<Sign>,
}

impl SignList {
    /// Adds a sign, replacing in place any sign already on the same voxel face.
    pub fn add(&mut self, sign: Sign) {
        match self
            .signs
            .iter_mut()
            .find(|s| (s.x, s.y, s.z, s.face) == (sign.x, sign.y, sign.z, sign.face))
        {
            Some(existing) => existing.text = sign.text,
            None => self.signs.push(sign),
        }
    }

    /// Removes the sign on one voxel face.
    pub fn remove(&mut self, x: i32, y: i32, z: i32, face: i32) -> bool {
        let before = self.signs.len();
        self.signs
            .retain(|s| (s.x, s.y, s.z, s.face) != (x, y, z, face));
        self.signs.len() != before
    }

    /// Removes every sign on a voxel.
    pub fn remove_all(&mut self, x: i32, y: i32, z: i32) -> bool {
        let before = self.signs.len();
        self.signs.retain(|s| (s.x, s.y, s.z) != (x, y, z));
        self.signs.len() != before
    }

    /// The text on one voxel face.
    pub fn get(&self, x: i32, y: i32, z: i32, face: i32) -> Option<&str> {
        self.signs
            .iter()
            .find(|s| (s.x, s.y, s.z, s.face) == (x, y, z, face))
            .map(|s| s.text.as_str())
    }

    /// Signs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Sign> {
        self.signs.iter()
    }

    /// Number of signs.
    pub fn len(&self) -> usize {
        self.signs.len()
    }

    /// Whether there are no signs.
    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }
}
