//! GPS accuracy jitter.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::Coordinate;

/// Accuracy values (meters) a re-emitted coordinate is drawn from.
///
/// Duplicates weight the distribution towards good fixes.
pub const ACCURACY_CHOICES: [f64; 8] = [5.0, 5.0, 5.0, 10.0, 10.0, 30.0, 50.0, 65.0];

/// Replaces `coordinate.accuracy` with a random draw from [`ACCURACY_CHOICES`].
pub fn resample_accuracy(coordinate: &mut Coordinate) {
    resample_accuracy_with(coordinate, &mut rand::rng());
}

/// Same as [`resample_accuracy`] with a caller supplied random source.
pub fn resample_accuracy_with<R: Rng + ?Sized>(coordinate: &mut Coordinate, rng: &mut R) {
    if let Some(&accuracy) = ACCURACY_CHOICES.choose(rng) {
        coordinate.accuracy = accuracy;
    }
}
