use xxhash_rust::xxh3::Xxh3;

use crate::eval::timeline::RenderableState;

const XXH3_SEED: u64 = 0x5c4e_11a7_d0e2_93b1;

/// Stable per-frame fingerprint used by static-frame elision.
///
/// The frame index is not hashed, so consecutive frames in which nothing moves compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FrameFingerprint {
    pub(crate) hi: u64,
    pub(crate) lo: u64,
}

/// Fingerprint the evaluated states of one frame.
///
/// Everything except position is fixed by the validated scene, so ids and positions are enough.
pub(crate) fn fingerprint_states(states: &[RenderableState<'_>]) -> FrameFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(states.len() as u64);
    for s in states {
        h.write_str(&s.object.id);
        h.write_f64(s.position.x);
        h.write_f64(s.position.y);
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> FrameFingerprint {
        let v = self.inner.digest128();
        FrameFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parser::parse_scene;
    use crate::eval::timeline::states_at;
    use crate::schema::validate::validate;

    #[test]
    fn still_frames_match_and_moving_frames_differ() {
        let scene = parse_scene(
            "FPS 10\nDURATION 3\nSHAPE CIRCLE ID a AT 100,100 RADIUS 10 COLOR #ffffff\nMOVE a TO 200,100 DUR 1\n",
        )
        .unwrap();
        let scene = validate(&scene).unwrap();

        let at = |t: f64| fingerprint_states(&states_at(&scene, t));
        assert_ne!(at(0.0), at(0.5));
        assert_eq!(at(1.5), at(2.5));
        assert_eq!(at(0.5), at(0.5));
    }
}
