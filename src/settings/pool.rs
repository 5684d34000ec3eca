//! Worker pool sizing.

use std::num::NonZeroUsize;

use crate::config::Config;
use crate::settings::error::SettingsError;

pub const DEFAULT_POOL_SIZE_MIN: i32 = 2;
pub const DEFAULT_POOL_SIZE_FACTOR: f64 = 1.0;
pub const DEFAULT_POOL_SIZE_MAX: i32 = 2;

/// Number of threads the host can run in parallel, at least 1.
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// `round(parallelism * scalar)` raised to `floor`, then capped at `ceiling`.
///
/// The ceiling wins when the bounds are inverted. A negative or NaN scalar
/// scales to zero and so yields the floor.
pub fn scaled_pool_size_with(
    parallelism: usize,
    floor: i32,
    scalar: f64,
    ceiling: i32,
) -> i32 {
    // `as` saturates on overflow and maps NaN to zero.
    let scaled = (parallelism as f64 * scalar).round() as i32;
    scaled.max(floor).min(ceiling)
}

/// [`scaled_pool_size_with`] using the host's available parallelism.
pub fn scaled_pool_size(floor: i32, scalar: f64, ceiling: i32) -> i32 {
    scaled_pool_size_with(available_parallelism(), floor, scalar, ceiling)
}

/// Size a worker pool from its `*-socket-worker-pool` section.
pub(crate) fn worker_pool_size(
    section: Option<&Config>,
    parallelism: usize,
) -> Result<i32, SettingsError> {
    let Some(section) = section else {
        return Ok(scaled_pool_size_with(
            parallelism,
            DEFAULT_POOL_SIZE_MIN,
            DEFAULT_POOL_SIZE_FACTOR,
            DEFAULT_POOL_SIZE_MAX,
        ));
    };

    let floor = match section.get_int("pool-size-min")? {
        Some(v) => super::to_i32("pool-size-min", v)?,
        None => DEFAULT_POOL_SIZE_MIN,
    };
    let scalar = section
        .get_double("pool-size-factor")?
        .unwrap_or(DEFAULT_POOL_SIZE_FACTOR);
    let ceiling = match section.get_int("pool-size-max")? {
        Some(v) => super::to_i32("pool-size-max", v)?,
        None => DEFAULT_POOL_SIZE_MAX,
    };

    Ok(scaled_pool_size_with(parallelism, floor, scalar, ceiling))
}
