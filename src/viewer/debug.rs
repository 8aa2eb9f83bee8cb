/*
 * Debug Information Module
 *
 * Frame timing and simulation counters shown in the control panel and, when
 * enabled, as an on-screen overlay.
 */

use std::time::Duration;

#[derive(Debug, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub ticks_per_frame: usize,
    pub mean_speed: f32,
}
