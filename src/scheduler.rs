use crate::bus::WordBus;
use crate::config::SensorConfig;
use crate::messages::{Header, Measurements, PowerMessage};
use crate::sensors::Ina219;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

pub const DEFAULT_FREQUENCY_HZ: u32 = 10;
/// Fastest sampling rate the ticker can hold (1 ms period)
pub const MAX_FREQUENCY_HZ: u32 = 1000;

const DEVICE_ID: &str = "ina219_monitor";

/// Handle to a running sampling task
pub struct Sampler {
    id: String,
    receiver: watch::Receiver<Option<PowerMessage>>,
    task: JoinHandle<()>,
}

impl Sampler {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Latest sample; `None` until the first successful fetch
    pub fn receiver(&self) -> watch::Receiver<Option<PowerMessage>> {
        self.receiver.clone()
    }

    pub fn latest(&self) -> Option<Measurements> {
        self.receiver.borrow().as_ref().map(|msg| msg.measurements)
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Dropping the handle stops the task
impl Drop for Sampler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Never shorter than 1 ms; frequency 0 counts as 1 Hz
fn period(frequency: u32) -> Duration {
    let micros = 1_000_000 / u64::from(frequency.max(1));
    Duration::from_micros(micros).max(Duration::from_millis(1))
}

/// Fetches from `sensor` at `frequency` Hz and publishes every successful
/// reading. Failed fetches are logged and retried on the next tick.
/// Rates above MAX_FREQUENCY_HZ run at MAX_FREQUENCY_HZ.
/// Must be called from within a tokio runtime.
pub fn spawn_sampler<B>(id: String, mut sensor: Ina219<B>, frequency: u32) -> Sampler
where
    B: WordBus + Send + 'static,
{
    let (sender, receiver) = watch::channel(None);
    let sensor_id = id.clone();

    let task = tokio::spawn(async move {
        info!("[{}] Starting sampler task at {}Hz", sensor_id, frequency.max(1));
        let mut ticker = interval(period(frequency));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sequence_counter = 0u64;

        loop {
            ticker.tick().await;

            match sensor.fetch() {
                Ok(()) => {
                    sequence_counter += 1;
                    let msg = PowerMessage {
                        h: Header::new(DEVICE_ID.to_string(), sensor_id.clone(), sequence_counter),
                        measurements: sensor.measurements(),
                    };
                    if sender.send(Some(msg)).is_err() {
                        info!("[{}] No receivers left, stopping sampler", sensor_id);
                        break;
                    }
                }
                Err(e) => {
                    warn!("[{}] Sensor read error: {}", sensor_id, e);
                }
            }
        }
    });

    Sampler { id, receiver, task }
}

/// Starts one sampler per configured sensor
pub fn spawn_sensor_tasks(sensor_config: &SensorConfig) -> Vec<Sampler> {
    sensor_config
        .sensors
        .iter()
        .map(|s| {
            let sensor = Ina219::from_entry(s);
            let frequency = s.frequency.unwrap_or(DEFAULT_FREQUENCY_HZ);
            spawn_sampler(s.id.clone(), sensor, frequency)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mock::{MockBus, MockError};
    use crate::registers::Register;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[test]
    fn test_period_from_frequency() {
        assert_eq!(period(10), Duration::from_millis(100));
        assert_eq!(period(1000), Duration::from_millis(1));
        assert_eq!(period(0), Duration::from_millis(1000));
        assert_eq!(period(2000), Duration::from_millis(1));
        assert_eq!(period(u32::MAX), Duration::from_millis(1));
    }

    /// Fails every transfer and counts the attempts
    struct DeadBus {
        attempts: Arc<AtomicUsize>,
    }

    impl WordBus for DeadBus {
        type Error = MockError;

        fn write_word(&mut self, _address: u8, register: u8, _value: u16) -> Result<(), MockError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(MockError { register })
        }

        fn read_word(&mut self, _address: u8, register: u8) -> Result<u16, MockError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(MockError { register })
        }
    }

    #[tokio::test]
    async fn test_sampler_above_max_frequency_keeps_running() {
        let mut mock = MockBus::new();
        mock.set_register(Register::Current.addr(), 0x0064);

        let sampler = spawn_sampler("fast".to_string(), Ina219::with_bus(0x40, mock), 2000);
        let mut rx = sampler.receiver();
        rx.changed().await.unwrap();
        rx.changed().await.unwrap();

        assert!(rx.borrow().as_ref().unwrap().h.seq >= 2);
    }

    #[tokio::test]
    async fn test_dropped_sampler_stops_touching_bus() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let bus = DeadBus {
            attempts: attempts.clone(),
        };

        let sampler = spawn_sampler("absent".to_string(), Ina219::with_bus(0x40, bus), 100);
        sleep(Duration::from_millis(50)).await;
        assert!(attempts.load(Ordering::SeqCst) > 0);

        drop(sampler);
        tokio::task::yield_now().await;
        let after_drop = attempts.load(Ordering::SeqCst);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), after_drop);
    }

    #[tokio::test]
    async fn test_sampler_publishes_readings() {
        let mut mock = MockBus::new();
        mock.set_register(Register::BusVoltage.addr(), 0x1000);
        mock.set_register(Register::ShuntVoltage.addr(), 0x0032);
        mock.set_register(Register::Current.addr(), 0x0064);
        mock.set_register(Register::Power.addr(), 0x00C8);

        let sampler = spawn_sampler("battery".to_string(), Ina219::with_bus(0x40, mock), 1000);
        let mut rx = sampler.receiver();
        rx.changed().await.unwrap();

        let msg = rx.borrow().clone().unwrap();
        assert_eq!(msg.sensor_id(), "battery");
        assert!(msg.h.seq >= 1);
        assert!((msg.measurements.bus_voltage - 2.048).abs() < 1e-9);
        assert!((msg.measurements.power - 1.6).abs() < 1e-9);
        assert!(sampler.latest().is_some());
        sampler.abort();
    }

    #[tokio::test]
    async fn test_sampler_survives_failed_fetch() {
        let mut mock = MockBus::new();
        mock.fail_next(Register::Configuration.addr(), 2);
        mock.set_register(Register::Current.addr(), 0x0064);

        let sampler = spawn_sampler("flaky".to_string(), Ina219::with_bus(0x40, mock), 1000);
        let mut rx = sampler.receiver();
        rx.changed().await.unwrap();

        let msg = rx.borrow().clone().unwrap();
        assert_eq!(msg.h.seq, 1);
        assert!((msg.measurements.current - 0.04).abs() < 1e-9);
        sampler.abort();
    }
}
