use super::*;
use std::cell::RefCell;

fn drive(chunk: usize, total: usize) -> Vec<ChunkProgress> {
    let seen = RefCell::new(Vec::new());
    {
        let mut control = RunControl::new(chunk).with_progress(|p| seen.borrow_mut().push(p));
        for done in 1..=total {
            control.check_processed(Phase::Execution, done, total);
        }
        control.phase_finished(Phase::Execution, total, total);
    }
    seen.into_inner()
}

#[test]
fn test_chunks_with_partial_tail() {
    let chunks = drive(25, 60);
    let sizes: Vec<_> = chunks.iter().map(|c| c.checks_in_chunk).collect();
    let done: Vec<_> = chunks.iter().map(|c| c.checks_completed).collect();
    assert_eq!(sizes, vec![25, 25, 10]);
    assert_eq!(done, vec![25, 50, 60]);
    assert!(chunks.iter().all(|c| c.total_checks == 60));
}

#[test]
fn test_exact_multiple_has_no_tail() {
    assert_eq!(drive(5, 10).len(), 2);
}

#[test]
fn test_empty_pass_emits_nothing() {
    assert!(drive(25, 0).is_empty());
}

#[test]
fn test_cancel_flag_is_polled() {
    let flag = AtomicBool::new(false);
    let control = RunControl::new(1).with_cancel(&flag);
    assert!(!control.is_canceled());
    flag.store(true, Ordering::SeqCst);
    assert!(control.is_canceled());
    assert!(!RunControl::unattended().is_canceled());
}
