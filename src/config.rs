use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::track::TrackParams;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub tick_hz: u32,
    pub track: TrackParams,
    pub track_seed: Option<u64>,
    pub ai_cars: usize,
}

impl ServerConfig {
    /// Loads `.env` (if any), then reads `CIRCUIT_*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable when a value does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TrackParams::default();

        let bind = parse_or(&lookup, "CIRCUIT_BIND", SocketAddr::from(([0, 0, 0, 0], 9001)))?;
        let tick_hz: u32 = parse_or(&lookup, "CIRCUIT_TICK_HZ", 60)?;
        anyhow::ensure!(tick_hz > 0, "CIRCUIT_TICK_HZ must be positive");

        let point_count = parse_or(&lookup, "CIRCUIT_TRACK_POINTS", defaults.point_count)?;
        let base_radius = parse_or(&lookup, "CIRCUIT_TRACK_RADIUS", defaults.base_radius)?;
        let half_width = parse_or(&lookup, "CIRCUIT_TRACK_HALF_WIDTH", defaults.half_width)?;
        let a1: Option<f32> = parse_opt(&lookup, "CIRCUIT_TRACK_A1")?;
        let a2: Option<f32> = parse_opt(&lookup, "CIRCUIT_TRACK_A2")?;
        let track_seed = parse_opt(&lookup, "CIRCUIT_TRACK_SEED")?;
        let ai_cars = parse_or(&lookup, "CIRCUIT_AI_CARS", 3)?;

        let track = match track_seed {
            Some(_) if a1.is_some() || a2.is_some() => {
                anyhow::bail!("CIRCUIT_TRACK_SEED cannot be combined with CIRCUIT_TRACK_A1 / CIRCUIT_TRACK_A2")
            }
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                TrackParams::randomized(&mut rng, point_count, base_radius, half_width)
            }
            None => TrackParams {
                point_count,
                base_radius,
                amplitudes: [
                    a1.unwrap_or(defaults.amplitudes[0]),
                    a2.unwrap_or(defaults.amplitudes[1]),
                ],
                half_width,
            },
        };

        Ok(Self { bind, tick_hz, track, track_seed, ai_cars })
    }
}

fn parse_opt<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("{key}={raw:?} is not valid")))
        .transpose()
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}
