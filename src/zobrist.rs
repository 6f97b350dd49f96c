use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::bits::{MAX_SIZE, Position};

type Table = [[u64; MAX_SIZE]; MAX_SIZE];

/// Zobrist keys for search states. A state's hash is the XOR of one key per
/// box square and one key for the canonical player square.
pub struct Zobrist {
    box_keys: Box<Table>,
    player_keys: Box<Table>,
}

impl Zobrist {
    pub fn new() -> Self {
        // Fixed seed: hashes (and so hash map iteration) are reproducible
        let mut rng = ChaCha8Rng::seed_from_u64(0x5c0b_0b07_d00d_f00d);

        let mut box_keys = Box::new([[0u64; MAX_SIZE]; MAX_SIZE]);
        let mut player_keys = Box::new([[0u64; MAX_SIZE]; MAX_SIZE]);
        for table in [&mut box_keys, &mut player_keys] {
            for row in table.iter_mut() {
                for key in row.iter_mut() {
                    *key = rng.next_u64();
                }
            }
        }

        Zobrist {
            box_keys,
            player_keys,
        }
    }

    pub fn box_key(&self, pos: Position) -> u64 {
        self.box_keys[pos.y as usize][pos.x as usize]
    }

    pub fn player_key(&self, pos: Position) -> u64 {
        self.player_keys[pos.y as usize][pos.x as usize]
    }

    pub fn boxes_hash(&self, boxes: &[Position]) -> u64 {
        boxes.iter().fold(0, |hash, &pos| hash ^ self.box_key(pos))
    }

    pub fn hash(&self, player: Position, boxes: &[Position]) -> u64 {
        self.boxes_hash(boxes) ^ self.player_key(player)
    }
}

impl Default for Zobrist {
    fn default() -> Self {
        Self::new()
    }
}
