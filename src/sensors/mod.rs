//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and fills the per-cycle
//! [`SensorSnapshot`] that gets written into `FsmContext.sensors`.

pub mod proximity;
pub mod ultrasonic;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::fsm::context::{ProximityReading, SonarFrame};
use proximity::ProximityDetector;
use ultrasonic::{MicrosClock, UltrasonicSensor};

/// Aggregates all sensor drivers.
///
/// `C` is the time source used both to pace trigger pulses and to time
/// echoes.
pub struct SensorHub<T, E, P, C> {
    pub front: UltrasonicSensor<T, E>,
    pub left: UltrasonicSensor<T, E>,
    pub right: UltrasonicSensor<T, E>,
    pub proximity: ProximityDetector<P>,
    clock: C,
}

impl<T, E, P, C> SensorHub<T, E, P, C>
where
    T: OutputPin,
    E: InputPin,
    P: InputPin,
    C: MicrosClock + DelayNs,
{
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(
        front: UltrasonicSensor<T, E>,
        left: UltrasonicSensor<T, E>,
        right: UltrasonicSensor<T, E>,
        proximity: ProximityDetector<P>,
        clock: C,
    ) -> Self {
        Self {
            front,
            left,
            right,
            proximity,
            clock,
        }
    }

    /// Measure front, then left, then right.  Failed channels read as the
    /// sentinel distance.
    pub fn read_sonar(&mut self) -> SonarFrame {
        let front = self.front.distance_cm(&mut self.clock);
        let left = self.left.distance_cm(&mut self.clock);
        let right = self.right.distance_cm(&mut self.clock);
        SonarFrame { front, left, right }
    }

    pub fn read_proximity(&mut self) -> ProximityReading {
        self.proximity.read()
    }
}
