#![cfg(feature = "archive")]

mod common;

use common::MemoryTransport;
use edibridge::archive::*;
use edibridge::config::MailboxConfig;
use edibridge::core::*;
use edibridge::transport::LocalTransport;

const SRC_A: &str = "/EDI850_Orders/a.xml";
const DST_A: &str = "/EDI850_Orders/Archived/a.xml";
const SRC_B: &str = "/EDI850_Orders/b.xml";
const DST_B: &str = "/EDI850_Orders/Archived/b.xml";

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn mailbox() -> MemoryTransport {
    MemoryTransport::new()
        .with_file(SRC_A, "<File><Document/></File>")
        .with_file(SRC_B, "<File><Document><PurchaseOrderNumber>B</PurchaseOrderNumber></Document></File>")
}

fn coordinator(transport: &MemoryTransport) -> ArchiveCoordinator<MemoryTransport> {
    ArchiveCoordinator::new(transport.clone(), MailboxConfig::default())
}

#[test]
fn verified_copy_then_delete() {
    let transport = mailbox();
    let report = coordinator(&transport)
        .archive_files(&names(&["a.xml", "b.xml"]))
        .unwrap();

    assert_eq!(report.archived, ["a.xml", "b.xml"]);
    assert!(report.failed.is_empty());
    assert!(report.source_retained.is_empty());
    assert!(report.is_complete());

    assert!(!transport.exists(SRC_A));
    assert_eq!(transport.get(DST_A).unwrap(), b"<File><Document/></File>");
    assert!(!transport.exists(SRC_B));
    assert!(transport.exists(DST_B));

    let state = transport.state.borrow();
    assert_eq!(state.connects, 1);
    assert_eq!(state.disconnects, 1);
    // source read, then the archived copy read back for verification
    assert_eq!(state.reads, [SRC_A, DST_A, SRC_B, DST_B]);
}

#[test]
fn upload_failure_never_deletes_source() {
    let transport = mailbox();
    transport.state.borrow_mut().fail_write.insert(DST_A.into());
    let report = coordinator(&transport)
        .archive_files(&names(&["a.xml", "b.xml"]))
        .unwrap();

    assert_eq!(report.archived, ["b.xml"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].filename, "a.xml");
    assert!(report.failed[0].reason.contains("staged"));
    assert!(transport.exists(SRC_A));
    assert!(!transport.deletes().contains(&SRC_A.to_string()));
}

#[test]
fn length_mismatch_never_deletes_source() {
    let transport = mailbox();
    transport.state.borrow_mut().truncate_write.insert(DST_A.into());
    let report = coordinator(&transport)
        .archive_files(&names(&["a.xml"]))
        .unwrap();

    assert!(report.archived.is_empty());
    assert_eq!(report.failed[0].filename, "a.xml");
    assert!(report.failed[0].reason.contains("verification failed"));
    assert!(report.failed[0].reason.contains("uploaded"));
    assert!(transport.exists(SRC_A));
    assert!(transport.deletes().is_empty());
}

#[test]
fn delete_failure_still_archives_and_retains_source() {
    let transport = mailbox();
    transport.state.borrow_mut().fail_delete.insert(SRC_A.into());
    let report = coordinator(&transport)
        .archive_files(&names(&["a.xml", "b.xml"]))
        .unwrap();

    assert_eq!(report.archived, ["a.xml", "b.xml"]);
    assert_eq!(report.source_retained, ["a.xml"]);
    assert!(report.failed.is_empty());
    assert!(transport.exists(SRC_A));
    assert!(transport.exists(DST_A));
    assert!(!transport.exists(SRC_B));
}

#[test]
fn missing_source_fails_only_that_file() {
    let transport = mailbox();
    let report = coordinator(&transport)
        .archive_files(&names(&["gone.xml", "b.xml"]))
        .unwrap();
    assert_eq!(report.archived, ["b.xml"]);
    assert_eq!(report.failed[0].filename, "gone.xml");
    assert!(report.failed[0].reason.contains("pending"));
    assert_eq!(transport.writes(), [DST_B]);
}

#[test]
fn connection_failure_aborts_before_touching_files() {
    let transport = mailbox();
    transport.state.borrow_mut().fail_connect = true;
    let result = coordinator(&transport).archive_files(&names(&["a.xml"]));
    assert!(matches!(
        result,
        Err(EdiError::Transport(TransportError::Connection(_)))
    ));
    let state = transport.state.borrow();
    assert!(state.reads.is_empty());
    assert!(state.writes.is_empty());
    assert!(state.deletes.is_empty());
}

#[test]
fn lost_session_fails_remaining_files_without_attempting_them() {
    let transport = mailbox();
    transport.state.borrow_mut().drop_on_read.insert(SRC_A.into());
    let report = coordinator(&transport)
        .archive_files(&names(&["a.xml", "b.xml"]))
        .unwrap();

    assert!(report.archived.is_empty());
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed[1].reason.starts_with("not attempted"));
    assert!(transport.exists(SRC_B));
    assert_eq!(transport.state.borrow().reads, [SRC_A]);
}

#[test]
fn file_names_are_reduced_to_basename_and_checked() {
    let transport = mailbox();
    let report = coordinator(&transport)
        .archive_files(&names(&["../../EDI850_Orders/a.xml", "b.sh"]))
        .unwrap();
    assert_eq!(report.archived, ["a.xml"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].filename, "b.sh");
    assert!(transport.exists(SRC_B));
}

#[test]
fn archives_on_a_local_mailbox() {
    let dir = tempfile::tempdir().unwrap();
    let inbound = dir.path().join("EDI850_Orders");
    std::fs::create_dir_all(&inbound).unwrap();
    std::fs::write(inbound.join("po.xml"), "<File/>").unwrap();

    let coordinator = ArchiveCoordinator::new(LocalTransport::new(dir.path()), MailboxConfig::default());
    let report = coordinator.archive_files(&names(&["po.xml"])).unwrap();

    assert_eq!(report.archived, ["po.xml"]);
    assert!(!inbound.join("po.xml").exists());
    assert_eq!(
        std::fs::read_to_string(inbound.join("Archived").join("po.xml")).unwrap(),
        "<File/>"
    );
}
