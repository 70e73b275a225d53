//! Unit constants and the ISA atmosphere used for speed conversions.

/// Meters per nautical mile.
pub const NM: f64 = 1852.0;
/// Meters per second per knot.
pub const KTS: f64 = 1852.0 / 3600.0;
/// Meters per foot.
pub const FT: f64 = 0.3048;
/// Standard gravity (m/s²).
pub const G0: f64 = 9.80665;

const R_AIR: f64 = 287.05287;
const GAMMA: f64 = 1.40;
const P0: f64 = 101_325.0;
const RHO0: f64 = 1.225;
const T0: f64 = 288.15;
const LAPSE_RATE: f64 = -0.0065;
const TROPOPAUSE_M: f64 = 11_000.0;
const T_TROPOPAUSE: f64 = 216.65;
/// Scale height of the isothermal layer above the tropopause (m).
const STRAT_SCALE_HEIGHT_M: f64 = 6341.552161;

/// Pressure, density and temperature at a geopotential altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atmosphere {
    pub pressure_pa: f64,
    pub density: f64,
    pub temperature_k: f64,
}

/// ISA atmosphere up to the lower stratosphere.
pub fn isa(altitude_m: f64) -> Atmosphere {
    let h = altitude_m.max(0.0);
    let temperature_k = (T0 + LAPSE_RATE * h.min(TROPOPAUSE_M)).max(T_TROPOPAUSE);

    let exponent = -(G0 / (LAPSE_RATE * R_AIR)) - 1.0;
    let rho_trop = RHO0 * (temperature_k / T0).powf(exponent);
    let density = rho_trop * (-(h - TROPOPAUSE_M).max(0.0) / STRAT_SCALE_HEIGHT_M).exp();

    Atmosphere {
        pressure_pa: density * R_AIR * temperature_k,
        density,
        temperature_k,
    }
}

/// Convert calibrated airspeed to true airspeed (both m/s) at an altitude.
pub fn cas2tas(cas_mps: f64, altitude_m: f64) -> f64 {
    let atmos = isa(altitude_m);
    let k = (GAMMA - 1.0) / GAMMA;

    let qdyn = P0 * ((1.0 + RHO0 * cas_mps * cas_mps / (2.0 * P0 / k)).powf(1.0 / k) - 1.0);
    let tas = ((2.0 / k) * atmos.pressure_pa / atmos.density
        * ((1.0 + qdyn / atmos.pressure_pa).powf(k) - 1.0))
        .sqrt();

    tas.copysign(cas_mps)
}
