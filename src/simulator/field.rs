/// Simulated rice field: two sensors, one pump and the device's automatic
/// control logic.
///
/// Sensor drift per cycle:
///
/// | Sensor         | Pump ON        | Pump OFF        | Bounds  |
/// |----------------|----------------|-----------------|---------|
/// | moisture (%)   | +3.0 ..< 6.0   | −0.5 ..< 1.5    | 0..=100 |
/// | level (cm)     | +0.5 ..< 1.0   | −0.1 ..< 0.3    | ≥ 0     |
use rand::Rng;

use crate::config::schema::SimulatorConfig;
use crate::device::{MoistureCategory, PumpCommand, PumpState, Reading};

pub const READY_MESSAGE: &str = "System ready.";

#[derive(Debug, Clone)]
pub struct SoilMoistureSensor {
    value: f64,
}

impl SoilMoistureSensor {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            value: rng.random_range(5.0..25.0),
        }
    }

    pub fn read(&mut self, pump_on: bool, rng: &mut impl Rng) -> f64 {
        if pump_on {
            self.value += rng.random_range(3.0..6.0);
        } else {
            self.value -= rng.random_range(0.5..1.5);
        }
        self.value = self.value.clamp(0.0, 100.0);
        self.value
    }
}

#[derive(Debug, Clone)]
pub struct WaterLevelSensor {
    value: f64,
}

impl WaterLevelSensor {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            value: rng.random_range(1.0..3.0),
        }
    }

    pub fn read(&mut self, pump_on: bool, rng: &mut impl Rng) -> f64 {
        if pump_on {
            self.value += rng.random_range(0.5..1.0);
        } else {
            self.value -= rng.random_range(0.1..0.3);
        }
        self.value = self.value.max(0.0);
        self.value
    }
}

/// Thresholds of the automatic control logic.
#[derive(Debug, Clone, Copy)]
pub struct AutoThresholds {
    pub on_moisture: f64,
    pub off_moisture: f64,
    pub emergency_level: f64,
}

impl AutoThresholds {
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self {
            on_moisture: config.auto_on_moisture,
            off_moisture: config.auto_off_moisture,
            emergency_level: config.emergency_level_cm,
        }
    }
}

pub struct Field<R: Rng> {
    rng: R,
    moisture: SoilMoistureSensor,
    level: WaterLevelSensor,
    pump: PumpState,
    log: String,
    thresholds: AutoThresholds,
}

impl<R: Rng> Field<R> {
    pub fn new(mut rng: R, thresholds: AutoThresholds) -> Self {
        let moisture = SoilMoistureSensor::new(&mut rng);
        let level = WaterLevelSensor::new(&mut rng);
        Self {
            rng,
            moisture,
            level,
            pump: PumpState::Off,
            log: READY_MESSAGE.to_string(),
            thresholds,
        }
    }

    pub fn pump(&self) -> PumpState {
        self.pump
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    /// Read both sensors, apply the automatic logic and report the result.
    pub fn run_cycle(&mut self, timestamp: String) -> Reading {
        let pump_on = self.pump.is_on();
        let moisture = self.moisture.read(pump_on, &mut self.rng);
        let level = self.level.read(pump_on, &mut self.rng);
        let category = MoistureCategory::from_moisture(moisture);

        self.log = format!("Auto | moisture {moisture:.1}% ({category}), level {level:.1} cm");

        if level > self.thresholds.emergency_level {
            self.pump = PumpState::Off;
            self.log = "EMERGENCY: water level too high! Pump switched off.".to_string();
        } else if moisture <= self.thresholds.on_moisture {
            self.pump = PumpState::On;
        } else if moisture > self.thresholds.off_moisture {
            self.pump = PumpState::Off;
        }

        Reading {
            moisture: round1(moisture),
            level: round1(level),
            pump_state: self.pump,
            category: category.label().to_string(),
            timestamp,
            log: self.log.clone(),
        }
    }

    /// Operator override from `POST /control`.
    pub fn manual(&mut self, command: PumpCommand) {
        self.pump = command;
        self.log = format!("MANUAL OVERRIDE: pump set to {command} by the operator.");
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn field(seed: u64) -> Field<StdRng> {
        Field::new(
            StdRng::seed_from_u64(seed),
            AutoThresholds::from_config(&SimulatorConfig::default()),
        )
    }

    #[test]
    fn sensors_start_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let m = SoilMoistureSensor::new(&mut rng);
            let l = WaterLevelSensor::new(&mut rng);
            assert!((5.0..25.0).contains(&m.value));
            assert!((1.0..3.0).contains(&l.value));
        }
    }

    #[test]
    fn moisture_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sensor = SoilMoistureSensor { value: 98.0 };
        for _ in 0..10 {
            assert!(sensor.read(true, &mut rng) <= 100.0);
        }
        let mut sensor = SoilMoistureSensor { value: 1.0 };
        for _ in 0..10 {
            assert!(sensor.read(false, &mut rng) >= 0.0);
        }
    }

    #[test]
    fn level_never_negative() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut sensor = WaterLevelSensor { value: 0.2 };
        for _ in 0..10 {
            assert!(sensor.read(false, &mut rng) >= 0.0);
        }
    }

    #[test]
    fn dry_soil_switches_pump_on() {
        let mut f = field(3);
        f.moisture.value = 10.0;
        f.level.value = 2.0;
        let reading = f.run_cycle("08:00:00".to_string());
        assert_eq!(reading.pump_state, PumpState::On);
        assert!(reading.log.starts_with("Auto |"));
    }

    #[test]
    fn wet_soil_switches_pump_off() {
        let mut f = field(4);
        f.pump = PumpState::On;
        f.moisture.value = 60.0;
        f.level.value = 2.0;
        let reading = f.run_cycle("08:00:00".to_string());
        assert_eq!(reading.pump_state, PumpState::Off);
        assert_eq!(reading.category, "Sangat Basah");
    }

    #[test]
    fn high_water_forces_pump_off() {
        let mut f = field(5);
        f.pump = PumpState::On;
        f.moisture.value = 5.0;
        f.level.value = 16.0;
        let reading = f.run_cycle("08:00:00".to_string());
        assert_eq!(reading.pump_state, PumpState::Off);
        assert!(reading.log.starts_with("EMERGENCY"));
    }

    #[test]
    fn manual_override_sets_state_and_log() {
        let mut f = field(6);
        f.manual(PumpState::On);
        assert_eq!(f.pump(), PumpState::On);
        assert_eq!(f.log(), "MANUAL OVERRIDE: pump set to ON by the operator.");
    }

    #[test]
    fn readings_are_rounded() {
        let mut f = field(8);
        for _ in 0..20 {
            let r = f.run_cycle("t".to_string());
            assert_eq!(r.moisture, round1(r.moisture));
            assert_eq!(r.level, round1(r.level));
        }
    }
}
