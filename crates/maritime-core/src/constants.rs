//! Operation constants and tuning parameters.

use crate::types::Position;

// --- Route ---

/// Chennai port, where every operation starts and ends.
pub const SOURCE_POSITION: Position = Position::new(13.0827, 80.2707);

/// Operation target out at sea.
pub const DESTINATION_POSITION: Position = Position::new(13.094861, 80.522232);

/// Boundary radius around the destination (meters).
///
/// The alert text calls this the "10km" boundary. The number is what the
/// distance check uses.
pub const BOUNDARY_RADIUS_M: f64 = 1000.0;

// --- Timing ---

/// Delay between starting the engine and requesting HIN verification (ms).
pub const ENGINE_START_DELAY_MS: u64 = 3000;

/// Duration of one leg of travel, outbound or return (ms).
pub const LEG_DURATION_MS: u64 = 10_000;

/// Pause at the destination before the return leg begins (ms).
pub const RETURN_PAUSE_MS: u64 = 3000;

/// Interval between animation frames (ms), one display frame at ~60 Hz.
pub const FRAME_INTERVAL_MS: u64 = 16;

// --- Verification ---

/// The only hull identification number accepted by the verification step.
pub const ACCEPTED_HIN: &str = "IN7784";

/// Stand-in rendered in the failure log when an empty HIN is submitted.
pub const MISSING_HIN_LABEL: &str = "No HIN provided";

// --- Map ---

/// Zoom level used for the initial and reset map view.
pub const DEFAULT_ZOOM: u8 = 13;

/// Mean Earth radius in meters, matching the map surface's metric.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
