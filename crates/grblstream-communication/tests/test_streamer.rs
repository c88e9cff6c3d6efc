use grblstream_communication::{
    CommandSink, DeviceResponse, Line, LineDisplay, LineStatus, Streamer,
};
use grblstream_core::{Error, Result, StreamError};
use std::sync::{Arc, Mutex};

// Mock sink recording every write as a string
struct MockSink {
    sent: Arc<Mutex<Vec<String>>>,
}

impl MockSink {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (Self { sent: sent.clone() }, sent)
    }
}

impl CommandSink for MockSink {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(data).to_string());
        Ok(())
    }
}

#[test]
fn test_window_advance_scenario() {
    // capacity=10, three lines of transmit length 4 each ("G0X" + newline).
    let (sink, sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 10);

    streamer.enqueue(Line::new("g0 x")).unwrap();
    streamer.enqueue(Line::new("g0 y")).unwrap();
    streamer.enqueue(Line::new("g0 z")).unwrap();

    // Lines 1 and 2 fit (4+4=8 <= 10); line 3 is blocked (8+4=12 > 10).
    assert_eq!(sent.lock().unwrap().len(), 2);
    assert_eq!(streamer.used_capacity(), 8);
    assert_eq!(streamer.pending_count(), 1);
    assert_eq!(streamer.in_flight_count(), 2);

    // "ok" for line 1 frees 4 bytes; line 3 transmits (4+4=8 <= 10).
    let response = streamer.on_response("ok").unwrap();
    assert_eq!(response, DeviceResponse::Ok);
    assert_eq!(streamer.used_capacity(), 8);
    assert_eq!(streamer.pending_count(), 0);
    assert_eq!(streamer.in_flight_count(), 2);

    let sent = sent.lock().unwrap();
    assert_eq!(*sent, vec!["G0X\n", "G0Y\n", "G0Z\n"]);
}

#[test]
fn test_strict_fifo_never_skips_ahead() {
    // A shorter pending line that would fit must not jump the blocked head.
    let (sink, sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 8);

    streamer.enqueue(Line::new("G0")).unwrap(); // len 3, transmits
    streamer.enqueue(Line::new("G1 X10")).unwrap(); // len 6, blocked (3+6 > 8)
    assert_eq!(sent.lock().unwrap().len(), 1);

    streamer.enqueue(Line::new("M5")).unwrap(); // len 3, would fit, must wait
    assert_eq!(*sent.lock().unwrap(), vec!["G0\n"]);
    assert_eq!(streamer.pending_count(), 2);
    assert_eq!(streamer.used_capacity(), 3);
}

#[test]
fn test_advance_return_value() {
    let (sink, _sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 10);

    // Both queues empty: no-op, nothing outstanding.
    assert!(!streamer.advance().unwrap());

    // Head blocked behind an unacknowledged line: transmits nothing more,
    // but work remains outstanding.
    streamer.enqueue(Line::new("G0 X1")).unwrap(); // len 5, transmits
    streamer.enqueue(Line::new("G0 X2 Y2")).unwrap(); // len 7, blocked
    assert!(streamer.advance().unwrap());
    assert_eq!(streamer.used_capacity(), 5);
    assert_eq!(streamer.pending_count(), 1);
}

#[test]
fn test_error_response_scenario() {
    let (sink, _sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 128);

    streamer.enqueue(Line::new("M6 T2")).unwrap();
    streamer.enqueue(Line::new("G0 X0")).unwrap();

    let err = streamer.on_response("error:20").unwrap_err();
    match err {
        Error::Stream(StreamError::CommandRejected {
            gcode,
            response,
            description,
        }) => {
            assert_eq!(gcode, "M6 T2");
            assert_eq!(response, "error:20");
            assert_eq!(
                description,
                "Unsupported or invalid g-code command found in block."
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // The second line is untouched and still in flight.
    assert_eq!(streamer.in_flight_count(), 1);
    assert!(!streamer.finished());
}

#[test]
fn test_malformed_response_leaves_queues_untouched() {
    let (sink, _sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 128);

    streamer.enqueue(Line::new("G0 X1")).unwrap();
    streamer.enqueue(Line::new("G0 X2")).unwrap();
    let in_flight = streamer.in_flight_count();
    let pending = streamer.pending_count();

    let err = streamer.on_response("banana").unwrap_err();
    assert!(err.is_malformed_response());
    assert_eq!(streamer.in_flight_count(), in_flight);
    assert_eq!(streamer.pending_count(), pending);
}

#[test]
fn test_oversized_line_rejected_at_enqueue() {
    // A line that can never fit the buffer must not enter the queue, where
    // it would block the stream forever.
    let (sink, sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 8);

    let err = streamer.enqueue(Line::new("G1 X100 Y200 F500")).unwrap_err();
    match err {
        Error::Stream(StreamError::LineTooLong {
            gcode,
            transmit_len,
            capacity,
        }) => {
            assert_eq!(gcode, "G1 X100 Y200 F500");
            assert_eq!(transmit_len, "G1X100Y200F500".len() + 1);
            assert_eq!(capacity, 8);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert!(sent.lock().unwrap().is_empty());
    assert!(streamer.finished());

    // The stream keeps working for lines that do fit.
    streamer.enqueue(Line::new("M5")).unwrap();
    assert_eq!(*sent.lock().unwrap(), vec!["M5\n"]);
}

#[test]
fn test_alarm_is_out_of_band() {
    let (sink, _sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 128);

    streamer.enqueue(Line::new("G0 X1")).unwrap();
    let in_flight = streamer.in_flight_count();

    match streamer.on_response("ALARM:4").unwrap() {
        DeviceResponse::Alarm { code, .. } => assert_eq!(code, Some(4)),
        other => panic!("unexpected classification: {:?}", other),
    }
    assert_eq!(streamer.in_flight_count(), in_flight);

    // An alarm code outside the catalog's range still classifies as an
    // alarm rather than a fatal protocol violation.
    match streamer.on_response("ALARM:999").unwrap() {
        DeviceResponse::Alarm { code, raw } => {
            assert_eq!(code, None);
            assert_eq!(raw, "ALARM:999");
        }
        other => panic!("unexpected classification: {:?}", other),
    }
    assert_eq!(streamer.in_flight_count(), in_flight);
}

#[test]
fn test_status_report_is_out_of_band() {
    let (sink, _sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 128);

    streamer.enqueue(Line::new("G0 X1")).unwrap();
    let report = streamer.on_response("<Run|MPos:1.000,0.000,0.000>").unwrap();
    assert!(matches!(report, DeviceResponse::Report { .. }));
    assert_eq!(streamer.in_flight_count(), 1);
}

#[test]
fn test_responses_resolve_lines_in_transmit_order() {
    // Recorder tags status notifications with the line's index.
    struct Tagged {
        index: usize,
        events: Arc<Mutex<Vec<(usize, String)>>>,
    }
    impl LineDisplay for Tagged {
        fn marked_sent(&self) {}
        fn status_attached(&self, status: &str) {
            self.events
                .lock()
                .unwrap()
                .push((self.index, status.to_string()));
        }
    }

    let events: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let (sink, _sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 128);

    for (i, gcode) in ["G0 X1", "G0 X2", "G0 X3"].iter().enumerate() {
        let display = Arc::new(Tagged {
            index: i,
            events: events.clone(),
        });
        streamer
            .enqueue(Line::new(*gcode).with_display(display))
            .unwrap();
    }

    streamer.on_response("ok").unwrap();
    let _ = streamer.on_response("error:22");
    streamer.on_response("ok").unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            (0, "ok".to_string()),
            (1, "error:22".to_string()),
            (2, "ok".to_string()),
        ]
    );
    assert!(streamer.finished());
}

#[test]
fn test_window_advances_before_fault_is_surfaced() {
    // When an error frees capacity, the blocked line must already be
    // transmitted by the time the caller observes the rejection.
    let (sink, sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 6);

    streamer.enqueue(Line::new("G0 X1")).unwrap(); // len 5, transmits
    streamer.enqueue(Line::new("G0 X2")).unwrap(); // blocked (5+5 > 6)
    assert_eq!(sent.lock().unwrap().len(), 1);

    let err = streamer.on_response("error:22").unwrap_err();
    assert!(err.is_command_rejected());
    assert_eq!(*sent.lock().unwrap(), vec!["G0X1\n", "G0X2\n"]);
    assert_eq!(streamer.used_capacity(), 5);
}

#[test]
fn test_blank_line_is_streamed_and_acknowledged() {
    let (sink, sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 128);

    let line = Line::new("(header comment only)");
    assert!(line.is_blank());
    streamer.enqueue(line).unwrap();

    assert_eq!(*sent.lock().unwrap(), vec!["\n"]);
    assert_eq!(streamer.used_capacity(), 1);

    streamer.on_response("ok").unwrap();
    assert!(streamer.finished());
}

#[test]
fn test_ack_with_nothing_in_flight_is_protocol_violation() {
    let (sink, _sent) = MockSink::new();
    let mut streamer: Streamer<MockSink> = Streamer::with_capacity(sink, 128);

    let err = streamer.on_response("ok").unwrap_err();
    assert!(err.is_malformed_response());
}

#[test]
fn test_statuses_track_lifecycle() {
    struct StatusRecorder {
        seen: Arc<Mutex<Vec<LineStatus>>>,
    }
    impl LineDisplay for StatusRecorder {
        fn marked_sent(&self) {
            self.seen.lock().unwrap().push(LineStatus::Sent);
        }
        fn status_attached(&self, _status: &str) {
            self.seen.lock().unwrap().push(LineStatus::Acknowledged);
        }
    }

    let seen = Arc::new(Mutex::new(Vec::new()));
    let (sink, _sent) = MockSink::new();
    let mut streamer = Streamer::with_capacity(sink, 128);
    streamer
        .enqueue(Line::new("G0").with_display(Arc::new(StatusRecorder { seen: seen.clone() })))
        .unwrap();
    streamer.on_response("ok").unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![LineStatus::Sent, LineStatus::Acknowledged]
    );
}

#[test]
fn test_capacity_invariant_over_random_traffic() {
    use proptest::prelude::*;

    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(
            &proptest::collection::vec(("[A-Z][0-9 ]{0,12}", any::<bool>()), 1..40),
            |ops| {
                let (sink, _sent) = MockSink::new();
                let mut streamer = Streamer::with_capacity(sink, 24);
                for (gcode, respond) in ops {
                    streamer.enqueue(Line::new(gcode)).unwrap();
                    prop_assert!(streamer.used_capacity() <= streamer.capacity());
                    if respond && streamer.in_flight_count() > 0 {
                        streamer.on_response("ok").unwrap();
                        prop_assert!(streamer.used_capacity() <= streamer.capacity());
                    }
                }
                Ok(())
            },
        )
        .unwrap();
}
