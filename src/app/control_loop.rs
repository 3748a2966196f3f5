//! Cooperative super-loop.
//!
//! One iteration, in order:
//!
//! ```text
//!  ensure session ─▶ pump ─▶ drain commands ─▶ advance clock
//!        ─▶ sample + publish (every sample interval)
//!        ─▶ report + publish + day closeout (when due)
//! ```
//!
//! With simulated sensors the clock and the environment share one tick:
//! the clock is only advanced at a sampling boundary, immediately before
//! the sample is drawn, so presence memory counts down exactly once per
//! published reading. With physical sensors the clock runs on every
//! iteration and sampling keeps its own interval.
//!
//! All I/O goes through the port traits in [`NodeIo`], so the same loop
//! runs on the device and against in-memory fakes on the host.

use core::convert::Infallible;
use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::config::{NodeConfig, SensorMode};
use crate::error::{CommsError, Error, Result};
use crate::report::{encode, format_reading, format_report};

use super::commands::{InboundMessage, LampCommand};
use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, LampPort, SensorPort, TransportPort};
use super::service::NodeService;

/// Broker client identifier, `<prefix>-<hex>` with an unpadded upper-case
/// suffix below `0xFFFF`.
pub type ClientId = heapless::String<32>;

/// Everything the loop talks to.
pub struct NodeIo<C, T, S, L, E, D> {
    pub clock: C,
    pub transport: T,
    pub sensors: S,
    pub lamp: L,
    pub sink: E,
    pub delay: D,
}

pub struct ControlLoop<C, T, S, L, E, D> {
    config: NodeConfig,
    service: NodeService,
    io: NodeIo<C, T, S, L, E, D>,
    rng: Pcg64Mcg,
    last_sample_ms: u32,
}

impl<C, T, S, L, E, D> ControlLoop<C, T, S, L, E, D>
where
    C: ClockPort,
    T: TransportPort,
    S: SensorPort,
    L: LampPort,
    E: EventSink,
    D: DelayNs,
{
    pub fn new(config: NodeConfig, mut io: NodeIo<C, T, S, L, E, D>) -> Self {
        let now = io.clock.now_ms();
        let mut service = NodeService::new(&config, now);
        service.start(&mut io.sink);
        // Lamp output starts in a known state.
        io.lamp.set_lamp(false);

        let rng = match config.rng_seed {
            Some(seed) => Pcg64Mcg::seed_from_u64(seed.wrapping_add(0x9E37_79B9)),
            None => Pcg64Mcg::from_entropy(),
        };

        Self {
            config,
            service,
            io,
            rng,
            last_sample_ms: now,
        }
    }

    pub fn service(&self) -> &NodeService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut NodeService {
        &mut self.service
    }

    pub fn io(&self) -> &NodeIo<C, T, S, L, E, D> {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut NodeIo<C, T, S, L, E, D> {
        &mut self.io
    }

    /// Run forever. Returns only when the broker session cannot be
    /// re-established within the configured attempt bound.
    pub fn run(&mut self) -> Result<Infallible> {
        loop {
            self.run_once()?;
        }
    }

    pub fn run_once(&mut self) -> Result<()> {
        self.ensure_connected()?;
        self.io.transport.pump();
        self.drain_commands();

        let now = self.io.clock.now_ms();
        let sample_due = now.wrapping_sub(self.last_sample_ms) > self.config.sample_interval_ms;
        match self.config.sensor_mode {
            SensorMode::Simulated => {
                if sample_due {
                    self.last_sample_ms = now;
                    self.service.advance_clock(now, &mut self.io.sensors);
                    self.sample_and_publish();
                }
            }
            SensorMode::Physical => {
                self.service.advance_clock(now, &mut self.io.sensors);
                if sample_due {
                    self.last_sample_ms = now;
                    self.sample_and_publish();
                }
            }
        }

        self.report_if_due(now);
        Ok(())
    }

    // ── Broker session ────────────────────────────────────────

    fn client_id(&mut self) -> ClientId {
        let mut id = ClientId::new();
        let suffix: u16 = self.rng.gen_range(0..u16::MAX);
        let _ = write!(id, "{}-{:X}", self.config.mqtt_client_prefix, suffix);
        id
    }

    fn ensure_connected(&mut self) -> Result<()> {
        if self.io.transport.is_connected() {
            return Ok(());
        }

        let mut attempts: u32 = 0;
        loop {
            let id = self.client_id();
            info!(
                "MQTT: connecting to {}:{} as {}",
                self.config.mqtt_host, self.config.mqtt_port, id
            );

            match self.connect_and_subscribe(&id) {
                Ok(()) => {
                    info!("MQTT: connected");
                    return Ok(());
                }
                Err(e) => warn!(
                    "MQTT: {}, retrying in {} ms",
                    e, self.config.mqtt_reconnect_backoff_ms
                ),
            }

            attempts += 1;
            if let Some(max) = self.config.mqtt_max_reconnect_attempts {
                if attempts >= max {
                    return Err(Error::Comms(CommsError::ReconnectExhausted));
                }
            }
            self.io.delay.delay_ms(self.config.mqtt_reconnect_backoff_ms);
        }
    }

    fn connect_and_subscribe(&mut self, id: &str) -> core::result::Result<(), CommsError> {
        self.io.transport.connect(id)?;
        self.io
            .transport
            .subscribe(self.config.topics.lamp_command.as_str())?;
        info!("MQTT: subscribed to {}", self.config.topics.lamp_command);
        Ok(())
    }

    // ── Inbound ───────────────────────────────────────────────

    fn drain_commands(&mut self) {
        while let Some(msg) = self.io.transport.try_receive() {
            self.handle_message(&msg);
        }
    }

    fn handle_message(&mut self, msg: &InboundMessage) {
        if msg.topic.as_str() != self.config.topics.lamp_command.as_str() {
            debug!("MQTT: ignoring message on {}", msg.topic);
            return;
        }
        match LampCommand::parse(&msg.payload) {
            Some(cmd) => {
                let now = self.io.clock.now_ms();
                self.service
                    .handle_command(cmd, now, &mut self.io.lamp, &mut self.io.sink);
            }
            None => {
                debug!("MQTT: unrecognised lamp payload {:?}", msg.payload.as_slice());
                self.io.sink.emit(&AppEvent::CommandIgnored);
            }
        }
    }

    // ── Outbound ──────────────────────────────────────────────

    fn sample_and_publish(&mut self) {
        let reading = match self.service.sample(&mut self.io.sensors, &mut self.io.sink) {
            Ok(r) => r,
            Err(e) => {
                warn!("Sensors: {}", e);
                return;
            }
        };
        let published = encode(&format_reading(&reading)).and_then(|body| {
            self.io
                .transport
                .publish(self.config.topics.sensors.as_str(), &body)
        });
        if let Err(e) = published {
            warn!("MQTT: sensor publish dropped ({})", e);
        }
    }

    fn report_if_due(&mut self, now: u32) {
        let transport = &mut self.io.transport;
        let topic = self.config.topics.consumption.as_str();
        self.service.poll_report(now, &mut self.io.sink, |report| {
            let published =
                encode(&format_report(report)).and_then(|body| transport.publish(topic, &body));
            if let Err(e) = published {
                warn!("MQTT: report publish dropped ({})", e);
            }
        });
    }
}
