//! Trigger and capture state machine.
//!
//! The capture core coordinates four hardware subsystems to timestamp
//! logic-level transitions on up to four lanes:
//!
//! - the shared timer, whose one-shot synchronization pulse is the
//!   common start reference and whose clock the capture counters run on
//! - the four input-capture units, which latch the counter on each
//!   configured edge
//! - the change-notification unit, which detects any-edge triggers
//! - the four DMA engines, which move each latched value into the
//!   lane's region of the sample buffer
//!
//! A request programs every active lane, then either starts capture
//! immediately or arms exactly one trigger interrupt. The start
//! sequence itself runs identically from both call sites. Teardown is
//! asymmetric: lanes retire one by one as their DMA engines complete,
//! while a stop tears everything down at once.

use stigme_protocol::{CaptureRequest, Channel, Edge, CHANNEL_COUNT};

use crate::buffer::{self, SAMPLE_CAPACITY};
use crate::hw::{CaptureDma, ChangeNotifier, DmaSource, EdgeCapture, PinProbe, SyncTimer};
use crate::session::{CaptureEvent, Phase, Session, TriggerArm};

/// Reload period asserting the timer's synchronization pulse.
const SYNC_PULSE_PERIOD: u16 = 1;

/// Reasons a capture request is rejected before any hardware is
/// touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureError {
    /// Channel count outside 1..=4.
    ChannelCount,
    /// Request carries the none edge.
    EdgeNone,
    /// Per-lane sample quota does not fit the lane's buffer region.
    QuotaTooLarge,
}

/// The capture-control core.
///
/// Owns the peripheral control surfaces and the session state. All
/// mutation funnels through [`capture`](Self::capture),
/// [`handle_event`](Self::handle_event) and [`stop`](Self::stop);
/// callers serialize access between thread and interrupt context (see
/// [`crate::shared`]).
pub struct LogicAnalyzer<T, C, N, D, P> {
    timer: T,
    capture_units: C,
    notifier: N,
    dma: D,
    pins: P,
    session: Session,
}

impl<T, C, N, D, P> LogicAnalyzer<T, C, N, D, P>
where
    T: SyncTimer,
    C: EdgeCapture,
    N: ChangeNotifier,
    D: CaptureDma,
    P: PinProbe,
{
    /// Wrap the peripheral set. No hardware is touched until a request
    /// arrives.
    pub const fn new(timer: T, capture_units: C, notifier: N, dma: D, pins: P) -> Self {
        Self {
            timer,
            capture_units,
            notifier,
            dma,
            pins,
            session: Session::new(),
        }
    }

    /// Current session phase.
    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Lanes still filling their buffer regions.
    pub fn active_channels(&self) -> u8 {
        self.session.active_channels()
    }

    /// The pin snapshot latched when the last trigger fired.
    ///
    /// Stale until a trigger has fired at least once; the instrument
    /// reports whatever was latched most recently.
    pub fn initial_pin_states(&self) -> u8 {
        self.session.initial_pin_states()
    }

    /// Begin a capture session.
    ///
    /// Validates the request, tears down any session still in flight,
    /// programs each active lane's DMA engine and input-capture unit,
    /// then arms the trigger path — or runs the start sequence right
    /// away when no trigger lane is given.
    pub fn capture(&mut self, request: &CaptureRequest) -> Result<(), CaptureError> {
        Self::validate(request)?;

        // Latest command wins: a request landing while a session is
        // armed or running implies the old session is dead.
        if self.session.is_active() {
            self.stop();
        }

        self.configure_channels(request);
        self.select_trigger(request.edge, request.trigger);
        Ok(())
    }

    fn validate(request: &CaptureRequest) -> Result<(), CaptureError> {
        let count = usize::from(request.channel_count);
        if count == 0 || count > CHANNEL_COUNT {
            return Err(CaptureError::ChannelCount);
        }
        if request.edge == Edge::None {
            return Err(CaptureError::EdgeNone);
        }
        if usize::from(request.samples_per_channel) > SAMPLE_CAPACITY / count {
            return Err(CaptureError::QuotaTooLarge);
        }
        Ok(())
    }

    /// Program every active lane, in ascending lane order.
    ///
    /// Input capture starts latching as soon as it is armed, but the
    /// latched values stay zero while the clock source is held, and DMA
    /// is not moving them yet. Nothing reaches the sample buffer until
    /// the start sequence runs, which is what lets all lanes be armed
    /// here without racing the trigger.
    fn configure_channels(&mut self, request: &CaptureRequest) {
        let count = usize::from(request.channel_count);
        let clock = self.timer.capture_clock();

        for (channel, region) in Channel::ALL.iter().zip(buffer::partition(count)) {
            self.dma
                .configure(*channel, request.samples_per_channel, region, DmaSource::InputCapture);
            self.dma.enable_interrupt(*channel);
            self.capture_units.arm(*channel, request.edge, clock);
        }

        self.session.configure(request.channel_count);
    }

    /// Pick how the trigger condition is detected and arm exactly one
    /// detection path.
    fn select_trigger(&mut self, edge: Edge, trigger: Option<Channel>) {
        let Some(lane) = trigger else {
            self.run_start_sequence();
            return;
        };

        if edge == Edge::Any {
            // A capture unit interrupts on one polarity only; watching
            // both takes the change-notification unit.
            self.notifier.enable_interrupt(lane);
            self.session.arm(TriggerArm::LevelChange(lane));
        } else {
            self.capture_units.enable_interrupt(lane);
            self.session.arm(TriggerArm::EdgeInterrupt(lane));
        }
    }

    /// The hardware start sequence. Step order is load-bearing:
    ///
    /// 1. A minimal nonzero reload period makes the starting timer emit
    ///    the synchronization pulse every capture unit starts on.
    /// 2. Pin levels are snapshotted before anything is recorded.
    /// 3. DMA engines start back-to-back in descending lane order.
    ///    They cannot start simultaneously, so edges landing between
    ///    timer start and a lane's DMA start are lost on that lane.
    ///    Starting DMA before the timer would instead copy spurious
    ///    zero timestamps into the buffer.
    /// 4. The reload period returns to zero; the pulse is only needed
    ///    once per trigger.
    fn run_start_sequence(&mut self) {
        self.timer.set_period(SYNC_PULSE_PERIOD);
        self.timer.start();

        self.session.record_trigger(self.pins.read());

        let active = usize::from(self.session.active_channels());
        for channel in Channel::ALL[..active].iter().rev() {
            self.dma.start(*channel);
        }

        self.timer.set_period(0);
    }

    /// Feed a hardware event into the core.
    ///
    /// Called by interrupt glue. Events that do not match the current
    /// phase are dropped: a trigger can only start an armed session,
    /// and a completion can only retire a lane of a running one.
    pub fn handle_event(&mut self, event: CaptureEvent) {
        match (event, self.session.phase()) {
            (CaptureEvent::TriggerFired, Phase::Armed(arm)) => {
                self.disarm(arm);
                self.run_start_sequence();
            }
            (CaptureEvent::ChannelComplete(channel), Phase::Running) => {
                self.complete_channel(channel);
            }
            _ => {}
        }
    }

    /// Quiesce the interrupt source that delivered the trigger, so a
    /// second edge cannot re-enter the start sequence.
    fn disarm(&mut self, arm: TriggerArm) {
        match arm {
            TriggerArm::EdgeInterrupt(lane) => self.capture_units.disable_interrupt(lane),
            TriggerArm::LevelChange(_) => self.notifier.reset(),
        }
    }

    /// Retire one lane whose DMA engine met its transfer count.
    ///
    /// The shared timer keeps running until the last lane retires;
    /// the other lanes are still clocking from it.
    fn complete_channel(&mut self, channel: Channel) {
        self.dma.reset(channel);
        self.capture_units.reset(channel);

        if self.session.complete_one() {
            self.timer.reset();
        }
    }

    /// Unconditional teardown.
    ///
    /// Safe in any phase, including when no session exists; always
    /// leaves every peripheral reset and the session idle.
    pub fn stop(&mut self) {
        self.notifier.reset();
        self.timer.reset();

        for channel in Channel::ALL {
            self.capture_units.reset(channel);
            self.dma.reset(channel);
        }

        self.session.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use heapless::Vec;

    use crate::buffer::SampleRegion;
    use crate::hw::CaptureClock;

    /// Every hardware access the core performs, in order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        TimerPeriod(u16),
        TimerStart,
        TimerReset,
        Arm(Channel, Edge),
        IcIrqOn(Channel),
        IcIrqOff(Channel),
        IcReset(Channel),
        CnIrqOn(Channel),
        CnReset,
        DmaConfigure(Channel, u16, SampleRegion),
        DmaIrqOn(Channel),
        DmaStart(Channel),
        DmaReset(Channel),
        PinsRead,
    }

    type Log = RefCell<Vec<Op, 128>>;

    fn push(log: &Log, op: Op) {
        log.borrow_mut().push(op).unwrap();
    }

    struct TimerMock<'a>(&'a Log);

    impl SyncTimer for TimerMock<'_> {
        fn set_period(&mut self, ticks: u16) {
            push(self.0, Op::TimerPeriod(ticks));
        }

        fn start(&mut self) {
            push(self.0, Op::TimerStart);
        }

        fn reset(&mut self) {
            push(self.0, Op::TimerReset);
        }

        fn capture_clock(&self) -> CaptureClock {
            CaptureClock::Peripheral
        }
    }

    struct IcMock<'a>(&'a Log);

    impl EdgeCapture for IcMock<'_> {
        fn arm(&mut self, channel: Channel, edge: Edge, _clock: CaptureClock) {
            push(self.0, Op::Arm(channel, edge));
        }

        fn enable_interrupt(&mut self, channel: Channel) {
            push(self.0, Op::IcIrqOn(channel));
        }

        fn disable_interrupt(&mut self, channel: Channel) {
            push(self.0, Op::IcIrqOff(channel));
        }

        fn reset(&mut self, channel: Channel) {
            push(self.0, Op::IcReset(channel));
        }
    }

    struct CnMock<'a>(&'a Log);

    impl ChangeNotifier for CnMock<'_> {
        fn enable_interrupt(&mut self, channel: Channel) {
            push(self.0, Op::CnIrqOn(channel));
        }

        fn reset(&mut self) {
            push(self.0, Op::CnReset);
        }
    }

    struct DmaMock<'a>(&'a Log);

    impl CaptureDma for DmaMock<'_> {
        fn configure(
            &mut self,
            channel: Channel,
            transfers: u16,
            region: SampleRegion,
            _source: DmaSource,
        ) {
            push(self.0, Op::DmaConfigure(channel, transfers, region));
        }

        fn enable_interrupt(&mut self, channel: Channel) {
            push(self.0, Op::DmaIrqOn(channel));
        }

        fn start(&mut self, channel: Channel) {
            push(self.0, Op::DmaStart(channel));
        }

        fn reset(&mut self, channel: Channel) {
            push(self.0, Op::DmaReset(channel));
        }
    }

    struct PinsMock<'a> {
        log: &'a Log,
        levels: u8,
    }

    impl PinProbe for PinsMock<'_> {
        fn read(&mut self) -> u8 {
            push(self.log, Op::PinsRead);
            self.levels
        }
    }

    type Rig<'a> =
        LogicAnalyzer<TimerMock<'a>, IcMock<'a>, CnMock<'a>, DmaMock<'a>, PinsMock<'a>>;

    fn rig_with_pins(log: &Log, levels: u8) -> Rig<'_> {
        LogicAnalyzer::new(
            TimerMock(log),
            IcMock(log),
            CnMock(log),
            DmaMock(log),
            PinsMock { log, levels },
        )
    }

    fn rig(log: &Log) -> Rig<'_> {
        rig_with_pins(log, 0b0000_0101)
    }

    fn request(
        channel_count: u8,
        samples_per_channel: u16,
        edge: Edge,
        trigger: Option<Channel>,
    ) -> CaptureRequest {
        CaptureRequest {
            channel_count,
            samples_per_channel,
            edge,
            trigger,
        }
    }

    fn ops(log: &Log) -> Vec<Op, 128> {
        log.borrow().clone()
    }

    fn start_sequence_ops(log: &Log) -> Vec<Op, 128> {
        let mut sequence = Vec::new();
        for op in ops(log) {
            if sequence.is_empty() && op != Op::TimerPeriod(SYNC_PULSE_PERIOD) {
                continue;
            }
            sequence.push(op).unwrap();
        }
        sequence
    }

    #[test]
    fn test_rejects_zero_channels() {
        let log = Log::default();
        let mut analyzer = rig(&log);

        let result = analyzer.capture(&request(0, 100, Edge::Rising, None));
        assert_eq!(result, Err(CaptureError::ChannelCount));
        assert!(ops(&log).is_empty());
    }

    #[test]
    fn test_rejects_five_channels() {
        let log = Log::default();
        let mut analyzer = rig(&log);

        let result = analyzer.capture(&request(5, 100, Edge::Rising, None));
        assert_eq!(result, Err(CaptureError::ChannelCount));
        assert!(ops(&log).is_empty());
    }

    #[test]
    fn test_rejects_edge_none() {
        let log = Log::default();
        let mut analyzer = rig(&log);

        let result = analyzer.capture(&request(2, 100, Edge::None, None));
        assert_eq!(result, Err(CaptureError::EdgeNone));
        assert!(ops(&log).is_empty());
    }

    #[test]
    fn test_rejects_quota_exceeding_region() {
        let log = Log::default();
        let mut analyzer = rig(&log);

        // Four lanes split the buffer into 2_500-slot regions.
        let result = analyzer.capture(&request(4, 2_501, Edge::Rising, None));
        assert_eq!(result, Err(CaptureError::QuotaTooLarge));
        assert!(ops(&log).is_empty());

        assert!(analyzer.capture(&request(4, 2_500, Edge::Rising, None)).is_ok());
    }

    #[test]
    fn test_immediate_capture_runs_full_sequence() {
        let log = Log::default();
        let mut analyzer = rig_with_pins(&log, 0b0000_1100);

        analyzer
            .capture(&request(4, 2_500, Edge::Falling, None))
            .unwrap();

        let expected = [
            // Per-lane configuration, ascending.
            Op::DmaConfigure(Channel::La1, 2_500, SampleRegion { offset: 0, len: 2_500 }),
            Op::DmaIrqOn(Channel::La1),
            Op::Arm(Channel::La1, Edge::Falling),
            Op::DmaConfigure(Channel::La2, 2_500, SampleRegion { offset: 2_500, len: 2_500 }),
            Op::DmaIrqOn(Channel::La2),
            Op::Arm(Channel::La2, Edge::Falling),
            Op::DmaConfigure(Channel::La3, 2_500, SampleRegion { offset: 5_000, len: 2_500 }),
            Op::DmaIrqOn(Channel::La3),
            Op::Arm(Channel::La3, Edge::Falling),
            Op::DmaConfigure(Channel::La4, 2_500, SampleRegion { offset: 7_500, len: 2_500 }),
            Op::DmaIrqOn(Channel::La4),
            Op::Arm(Channel::La4, Edge::Falling),
            // Start sequence: sync pulse, snapshot, DMA descending,
            // pulse off.
            Op::TimerPeriod(1),
            Op::TimerStart,
            Op::PinsRead,
            Op::DmaStart(Channel::La4),
            Op::DmaStart(Channel::La3),
            Op::DmaStart(Channel::La2),
            Op::DmaStart(Channel::La1),
            Op::TimerPeriod(0),
        ];
        assert_eq!(&ops(&log)[..], &expected[..]);

        assert_eq!(analyzer.phase(), Phase::Running);
        assert_eq!(analyzer.active_channels(), 4);
        assert_eq!(analyzer.initial_pin_states(), 0b0000_1100);
    }

    #[test]
    fn test_dma_starts_descend_for_every_lane_count() {
        for count in 1..=4u8 {
            let log = Log::default();
            let mut analyzer = rig(&log);

            analyzer
                .capture(&request(count, 100, Edge::Rising, None))
                .unwrap();

            let starts: Vec<Channel, 4> = ops(&log)
                .iter()
                .filter_map(|op| match op {
                    Op::DmaStart(channel) => Some(*channel),
                    _ => None,
                })
                .collect();

            let mut expected: Vec<Channel, 4> =
                Channel::ALL[..usize::from(count)].iter().copied().collect();
            expected.reverse();
            assert_eq!(starts, expected);
        }
    }

    #[test]
    fn test_any_edge_trigger_arms_change_notification() {
        let log = Log::default();
        let mut analyzer = rig(&log);

        analyzer
            .capture(&request(2, 100, Edge::Any, Some(Channel::La2)))
            .unwrap();

        let recorded = ops(&log);
        assert!(recorded.contains(&Op::CnIrqOn(Channel::La2)));
        assert!(!recorded.iter().any(|op| matches!(op, Op::IcIrqOn(_))));
        assert!(!recorded.contains(&Op::TimerStart));
        assert_eq!(
            analyzer.phase(),
            Phase::Armed(TriggerArm::LevelChange(Channel::La2))
        );

        analyzer.handle_event(CaptureEvent::TriggerFired);

        // The change-notification source quiesces before the start
        // sequence runs.
        let sequence = start_sequence_ops(&log);
        let cn_reset_at = ops(&log).iter().position(|op| *op == Op::CnReset).unwrap();
        let pulse_at = ops(&log)
            .iter()
            .position(|op| *op == Op::TimerPeriod(1))
            .unwrap();
        assert!(cn_reset_at < pulse_at);
        assert!(sequence.contains(&Op::TimerStart));
        assert_eq!(analyzer.phase(), Phase::Running);
    }

    #[test]
    fn test_single_edge_trigger_arms_capture_interrupt() {
        let log = Log::default();
        let mut analyzer = rig(&log);

        analyzer
            .capture(&request(3, 100, Edge::Rising, Some(Channel::La3)))
            .unwrap();

        let recorded = ops(&log);
        assert!(recorded.contains(&Op::IcIrqOn(Channel::La3)));
        assert!(!recorded.iter().any(|op| matches!(op, Op::CnIrqOn(_))));
        assert!(!recorded.contains(&Op::TimerStart));
        assert_eq!(
            analyzer.phase(),
            Phase::Armed(TriggerArm::EdgeInterrupt(Channel::La3))
        );

        analyzer.handle_event(CaptureEvent::TriggerFired);

        let recorded = ops(&log);
        let irq_off_at = recorded
            .iter()
            .position(|op| *op == Op::IcIrqOff(Channel::La3))
            .unwrap();
        let pulse_at = recorded
            .iter()
            .position(|op| *op == Op::TimerPeriod(1))
            .unwrap();
        assert!(irq_off_at < pulse_at);
        assert_eq!(analyzer.phase(), Phase::Running);
    }

    #[test]
    fn test_trigger_event_ignored_when_idle() {
        let log = Log::default();
        let mut analyzer = rig(&log);

        analyzer.handle_event(CaptureEvent::TriggerFired);
        assert!(ops(&log).is_empty());
        assert_eq!(analyzer.phase(), Phase::Idle);
    }

    #[test]
    fn test_trigger_event_ignored_when_running() {
        let log = Log::default();
        let mut analyzer = rig(&log);
        analyzer.capture(&request(1, 100, Edge::Rising, None)).unwrap();
        log.borrow_mut().clear();

        analyzer.handle_event(CaptureEvent::TriggerFired);
        assert!(ops(&log).is_empty());
    }

    #[test]
    fn test_completion_retires_one_lane() {
        let log = Log::default();
        let mut analyzer = rig(&log);
        analyzer.capture(&request(2, 100, Edge::Rising, None)).unwrap();
        log.borrow_mut().clear();

        analyzer.handle_event(CaptureEvent::ChannelComplete(Channel::La1));

        let recorded = ops(&log);
        assert_eq!(
            &recorded[..],
            &[Op::DmaReset(Channel::La1), Op::IcReset(Channel::La1)]
        );
        assert_eq!(analyzer.active_channels(), 1);
        assert_eq!(analyzer.phase(), Phase::Running);
    }

    #[test]
    fn test_last_completion_resets_the_timer() {
        let log = Log::default();
        let mut analyzer = rig(&log);
        analyzer.capture(&request(2, 100, Edge::Rising, None)).unwrap();

        analyzer.handle_event(CaptureEvent::ChannelComplete(Channel::La1));
        assert!(!ops(&log).contains(&Op::TimerReset));

        analyzer.handle_event(CaptureEvent::ChannelComplete(Channel::La2));

        let recorded = ops(&log);
        let tail = &recorded[recorded.len() - 3..];
        assert_eq!(
            tail,
            &[
                Op::DmaReset(Channel::La2),
                Op::IcReset(Channel::La2),
                Op::TimerReset,
            ]
        );
        assert_eq!(analyzer.phase(), Phase::Idle);
        assert_eq!(analyzer.active_channels(), 0);
    }

    #[test]
    fn test_completion_ignored_when_idle() {
        let log = Log::default();
        let mut analyzer = rig(&log);

        analyzer.handle_event(CaptureEvent::ChannelComplete(Channel::La1));
        assert!(ops(&log).is_empty());
    }

    #[test]
    fn test_stop_resets_everything() {
        let log = Log::default();
        let mut analyzer = rig(&log);

        analyzer.stop();

        let expected = [
            Op::CnReset,
            Op::TimerReset,
            Op::IcReset(Channel::La1),
            Op::DmaReset(Channel::La1),
            Op::IcReset(Channel::La2),
            Op::DmaReset(Channel::La2),
            Op::IcReset(Channel::La3),
            Op::DmaReset(Channel::La3),
            Op::IcReset(Channel::La4),
            Op::DmaReset(Channel::La4),
        ];
        assert_eq!(&ops(&log)[..], &expected[..]);

        // Idempotent: a second stop performs the same teardown.
        log.borrow_mut().clear();
        analyzer.stop();
        assert_eq!(&ops(&log)[..], &expected[..]);
    }

    #[test]
    fn test_stop_while_running_idles_the_session() {
        let log = Log::default();
        let mut analyzer = rig(&log);
        analyzer.capture(&request(3, 100, Edge::Any, None)).unwrap();

        analyzer.stop();
        assert_eq!(analyzer.phase(), Phase::Idle);
        assert_eq!(analyzer.active_channels(), 0);
    }

    #[test]
    fn test_recapture_tears_down_the_armed_session() {
        let log = Log::default();
        let mut analyzer = rig(&log);
        analyzer
            .capture(&request(1, 100, Edge::Rising, Some(Channel::La1)))
            .unwrap();
        log.borrow_mut().clear();

        analyzer.capture(&request(2, 100, Edge::Falling, None)).unwrap();

        let recorded = ops(&log);
        // Full teardown precedes the new configuration.
        assert_eq!(recorded[0], Op::CnReset);
        assert_eq!(recorded[1], Op::TimerReset);
        let first_configure = recorded
            .iter()
            .position(|op| matches!(op, Op::DmaConfigure(_, _, _)))
            .unwrap();
        let last_reset = recorded
            .iter()
            .rposition(|op| matches!(op, Op::DmaReset(_) | Op::IcReset(_)))
            .unwrap();
        assert!(last_reset < first_configure);
        assert_eq!(analyzer.active_channels(), 2);
    }

    #[test]
    fn test_snapshot_survives_completion_and_stop() {
        let log = Log::default();
        let mut analyzer = rig_with_pins(&log, 0b1010_0001);
        analyzer.capture(&request(1, 100, Edge::Rising, None)).unwrap();
        assert_eq!(analyzer.initial_pin_states(), 0b1010_0001);

        analyzer.handle_event(CaptureEvent::ChannelComplete(Channel::La1));
        assert_eq!(analyzer.initial_pin_states(), 0b1010_0001);

        analyzer.stop();
        assert_eq!(analyzer.initial_pin_states(), 0b1010_0001);
    }

    #[test]
    fn test_armed_session_takes_no_snapshot_until_trigger() {
        let log = Log::default();
        let mut analyzer = rig_with_pins(&log, 0b0000_1111);

        analyzer
            .capture(&request(1, 100, Edge::Falling, Some(Channel::La1)))
            .unwrap();
        assert!(!ops(&log).contains(&Op::PinsRead));
        assert_eq!(analyzer.initial_pin_states(), 0);

        analyzer.handle_event(CaptureEvent::TriggerFired);
        assert_eq!(analyzer.initial_pin_states(), 0b0000_1111);
    }
}
