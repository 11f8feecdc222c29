use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

#[cfg(feature = "deterministic_zobrist")]
const ZOBRIST_SEED: u64 = 0x9E37_79B9_AAAC_5C87;

fn make_zobrist_rng() -> StdRng {
    #[cfg(feature = "deterministic_zobrist")]
    {
        StdRng::seed_from_u64(ZOBRIST_SEED)
    }
    #[cfg(not(feature = "deterministic_zobrist"))]
    {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        StdRng::from_seed(seed)
    }
}

/// The 793-word key table: 12 x 64 piece/square words, one side-to-move
/// word, 16 castling words indexed directly by the 4-bit rights mask, and
/// 8 en-passant file words.
pub struct ZobristKeys {
    /// [color][piece][square] with {White=0, Black=1} and {P,N,B,R,Q,K}={0..5}
    pub piece: [[[u64; 64]; 6]; 2],
    /// XORed into the hash when Black is to move.
    pub side_to_move: u64,
    /// One word per castling-rights mask, so a rights change is always two
    /// XORs: out with the old mask, in with the new. Identical masks cancel.
    pub castling: [u64; 16],
    /// a..h => 0..7
    pub ep_file: [u64; 8],
}

/// Process-wide keys, generated once on first use. The table is immutable
/// afterwards, so sharing it between boards is safe.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_zobrist_keys_with_rng(make_zobrist_rng()))
}

fn generate_zobrist_keys_with_rng(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut StdRng) -> u64 {
        // zero keys would alias "empty" in table probes
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        side_to_move: 0,
        castling: [0u64; 16],
        ep_file: [0u64; 8],
    };

    for c in 0..2 {
        for p in 0..6 {
            for sq in 0..64 {
                keys.piece[c][p][sq] = non_zero(&mut rng);
            }
        }
    }
    keys.side_to_move = non_zero(&mut rng);
    for mask in 0..16 {
        keys.castling[mask] = non_zero(&mut rng);
    }
    for f in 0..8 {
        keys.ep_file[f] = non_zero(&mut rng);
    }

    keys
}

/// XOR the castling contribution out with the old mask and in with the new.
#[inline]
pub fn xor_castling_rights_delta(hash: &mut u64, keys: &ZobristKeys, old: u8, new: u8) {
    *hash ^= keys.castling[old as usize];
    *hash ^= keys.castling[new as usize];
}
