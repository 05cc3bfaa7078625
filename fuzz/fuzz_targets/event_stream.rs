#![no_main]

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use rundelta_core::{ElementKind, EngineEvent, MutationRecord, Payload, SweepToken, TabularPayload};
use rundelta_state::{Document, EventOutcome};

#[derive(Arbitrary, Debug)]
enum Step {
    Start(u8),
    Finish,
    Replace { id: u8, kind: u8, tabular: bool, data: Vec<u8> },
    Append { id: u8, dataset: Option<u8>, rows: Vec<Vec<u8>> },
    Tagged { id: u8, generation: u8 },
    Timer(u64),
    Advance(u16),
}

fuzz_target!(|steps: Vec<Step>| {
    let mut doc = Document::new();
    let mut now = Instant::now();

    for step in steps {
        let event = match step {
            Step::Start(g) => EngineEvent::run_started(format!("g{}", g)),
            Step::Finish => EngineEvent::RunFinished,
            Step::Replace { id, kind, tabular, data } => {
                let kind = ElementKind::from_byte(kind).unwrap_or(ElementKind::Text);
                let payload = if tabular {
                    Payload::Tabular(TabularPayload::new(Bytes::from(data)))
                } else {
                    Payload::Blob(Bytes::from(data))
                };
                EngineEvent::mutation(format!("e{}", id % 16), MutationRecord::replace(kind, payload))
            }
            Step::Append { id, dataset, rows } => EngineEvent::mutation(
                format!("e{}", id % 16),
                MutationRecord::Append(rundelta_core::AppendRecord {
                    dataset: dataset.map(|d| format!("d{}", d % 4)),
                    rows: rows.into_iter().map(Bytes::from).collect(),
                }),
            ),
            Step::Tagged { id, generation } => EngineEvent::tagged_mutation(
                format!("e{}", id % 16),
                MutationRecord::replace(ElementKind::Text, Payload::None),
                format!("g{}", generation),
            ),
            Step::Timer(token) => EngineEvent::SweepTimerFired {
                token: SweepToken::new(token % 8),
            },
            Step::Advance(ms) => {
                now += Duration::from_millis(ms as u64);
                doc.poll_sweep(now);
                continue;
            }
        };

        let before = doc.store().len();
        match doc.handle_event(event, now) {
            Ok(EventOutcome::Swept(report)) => {
                assert!(doc.store().iter().all(|e| e.generation == report.generation));
            }
            Err(_) => assert_eq!(doc.store().len(), before),
            Ok(_) => {}
        }
    }

    let snapshot = doc.read();
    assert_eq!(snapshot.len(), doc.store().len());
});
