use std::collections::HashMap;

use super::types::VibeStats;
use crate::models::AudioFeatures;

fn to_scale(value: f32) -> u8 {
    (value * 10.0).round().clamp(1.0, 10.0) as u8
}

/// Average descriptors over the ids that have features. Ids without data are
/// skipped; if none have data every score is 5.
pub fn vibe_stats<'a, I>(ids: I, features: &HashMap<String, AudioFeatures>) -> VibeStats
where
    I: IntoIterator<Item = &'a str>,
{
    let known: Vec<&AudioFeatures> = ids.into_iter().filter_map(|id| features.get(id)).collect();
    if known.is_empty() {
        return VibeStats::default();
    }

    let n = known.len() as f32;
    let avg = |f: fn(&AudioFeatures) -> f32| known.iter().map(|a| f(a)).sum::<f32>() / n;

    VibeStats {
        energy: to_scale(avg(|a| a.energy)),
        melancholy: to_scale(1.0 - avg(|a| a.valence)),
        instrumental: to_scale(avg(|a| a.instrumentalness)),
        danceability: to_scale(avg(|a| a.danceability)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(energy: f32, valence: f32) -> AudioFeatures {
        AudioFeatures {
            energy,
            danceability: 0.5,
            valence,
            instrumentalness: 0.0,
            tempo: 100.0,
        }
    }

    #[test]
    fn test_defaults_without_features() {
        let stats = vibe_stats(["a", "b"], &HashMap::new());
        assert_eq!(stats, VibeStats::default());
        assert_eq!(stats.melancholy, 5);
    }

    #[test]
    fn test_averages_only_known_tracks() {
        let features = HashMap::from([
            ("a".to_string(), features(0.2, 0.1)),
            ("b".to_string(), features(0.4, 0.3)),
        ]);
        let stats = vibe_stats(["a", "b", "missing"], &features);

        assert_eq!(stats.energy, 3);
        assert_eq!(stats.melancholy, 8);
        assert_eq!(stats.danceability, 5);
        // Zero instrumentalness still reports the floor of the scale
        assert_eq!(stats.instrumental, 1);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let features = HashMap::from([("a".to_string(), features(1.0, 0.0))]);
        let stats = vibe_stats(["a"], &features);
        assert_eq!(stats.energy, 10);
        assert_eq!(stats.melancholy, 10);
    }
}
