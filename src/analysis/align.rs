use log::debug;

use crate::analysis::record::SampleTable;
use crate::analysis::segment::CycleWindow;
use crate::types::{OffsetConfiguration, SensorChannel, TRACKED_CHANNELS};

/// One tracked channel's cycle after its circular shift.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedSignal {
    pub channel: SensorChannel,
    pub shift: usize,
    pub samples: Vec<f64>,
}

/// `floor(degrees / 360 * n) mod n`, computed exactly in integers.
pub fn sample_shift(degrees: u16, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    (usize::from(degrees) * n / 360) % n
}

/// Per-channel shift on top of the shared global shift.
pub fn channel_shift(global: u16, channel: u16, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    (sample_shift(channel, n) + sample_shift(global, n)) % n
}

/// Circular rotation: `out[k] = samples[(k - shift) mod n]`. Negative shifts rotate left.
pub fn rotate(samples: &[f64], shift: isize) -> Vec<f64> {
    let mut out = samples.to_vec();
    if out.is_empty() {
        return out;
    }
    let k = shift.rem_euclid(out.len() as isize) as usize;
    out.rotate_right(k);
    out
}

pub fn align_channel(
    samples: &[f64],
    offsets: &OffsetConfiguration,
    channel: SensorChannel,
) -> AlignedSignal {
    let shift = channel_shift(offsets.global, offsets.channel(channel), samples.len());
    AlignedSignal {
        channel,
        shift,
        samples: rotate(samples, shift as isize),
    }
}

/// Extracts CH1..CH4 over `window` and aligns each one.
pub fn align_cycle(
    table: &SampleTable,
    window: CycleWindow,
    offsets: &OffsetConfiguration,
) -> Vec<AlignedSignal> {
    TRACKED_CHANNELS
        .iter()
        .map(|&channel| {
            let raw = table.values(channel, window.range());
            let aligned = align_channel(&raw, offsets, channel);
            debug!(
                "{} shifted by {} of {} samples",
                channel.label(),
                aligned.shift,
                raw.len()
            );
            aligned
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_signal(rng: &mut StdRng, n: usize) -> Vec<f64> {
        (0..n).map(|_| rng.gen_range(-50.0..50.0)).collect()
    }

    fn sorted(mut v: Vec<f64>) -> Vec<f64> {
        v.sort_by(|a, b| a.total_cmp(b));
        v
    }

    #[test]
    fn shifts_truncate_towards_zero() {
        assert_eq!(sample_shift(90, 100), 25);
        assert_eq!(sample_shift(165, 100), 45);
        assert_eq!(sample_shift(360, 100), 0);
        assert_eq!(sample_shift(1, 7), 0);
        // 165 * 24 / 360 is exactly 11; no float rounding below it.
        assert_eq!(sample_shift(165, 24), 11);
        assert_eq!(channel_shift(165, 270, 100), (75 + 45) % 100);
    }

    #[test]
    fn rotation_moves_samples_right() {
        let s = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(rotate(&s, 2), vec![4.0, 5.0, 1.0, 2.0, 3.0]);
        assert_eq!(rotate(&s, -2), vec![3.0, 4.0, 5.0, 1.0, 2.0]);
        assert_eq!(rotate(&s, 7), rotate(&s, 2));
        assert!(rotate(&[], 3).is_empty());
    }

    #[test]
    fn alignment_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n = rng.gen_range(2..400);
            let samples = random_signal(&mut rng, n);
            let offsets = OffsetConfiguration {
                global: rng.gen_range(0..=360),
                ch1: rng.gen_range(0..=360),
                ..OffsetConfiguration::zero()
            };
            let aligned = align_channel(&samples, &offsets, SensorChannel::Ch1);
            assert_eq!(aligned.samples.len(), n);
            assert_eq!(sorted(aligned.samples), sorted(samples));
        }
    }

    #[test]
    fn rotating_back_restores_the_signal() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let n = rng.gen_range(2..400);
            let samples = random_signal(&mut rng, n);
            let shift = sample_shift(rng.gen_range(0..=360), n) as isize;
            assert_eq!(rotate(&rotate(&samples, shift), -shift), samples);
        }
    }

    #[test]
    fn zero_offsets_are_the_identity() {
        let mut rng = StdRng::seed_from_u64(3);
        for n in 2..64 {
            let samples = random_signal(&mut rng, n);
            for channel in TRACKED_CHANNELS {
                let aligned = align_channel(&samples, &OffsetConfiguration::zero(), channel);
                assert_eq!(aligned.shift, 0);
                assert_eq!(aligned.samples, samples);
            }
        }
    }

    #[test]
    fn each_channel_uses_its_own_offset() {
        let samples: Vec<f64> = (0..8).map(f64::from).collect();
        let offsets = OffsetConfiguration {
            global: 45,
            ch1: 0,
            ch2: 90,
            ch3: 180,
            ch4: 315,
        };
        let shifts: Vec<usize> = TRACKED_CHANNELS
            .iter()
            .map(|&ch| align_channel(&samples, &offsets, ch).shift)
            .collect();
        assert_eq!(shifts, vec![1, 3, 5, 0]);
    }
}
