//! Exchange tests against a scripted TCP server.
//!
//! Each scripted turn accepts one connection, reads one `<EOF>`-terminated
//! command, answers with a canned response, and drops the connection —
//! the same shape as the real server.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wbunit_transport::{AasClient, Address, FaultKind, TransportError};

const SUFFIX: &[u8] = b"<EOF>";

/// Serve `responses` one connection at a time; resolves to the commands
/// received, with the terminator stripped.
async fn scripted_server(responses: Vec<&'static str>) -> (Address, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let mut received = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut buf = Vec::new();
            let mut chunk = [0u8; 256];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if buf.ends_with(SUFFIX) {
                    break;
                }
            }
            assert!(buf.ends_with(SUFFIX), "command missing terminator");
            buf.truncate(buf.len() - SUFFIX.len());
            received.push(String::from_utf8(buf).unwrap());

            stream.write_all(response.as_bytes()).await.unwrap();
        }
        received
    });

    (Address::new("127.0.0.1", port), handle)
}

#[tokio::test]
async fn acknowledgement_token_is_returned_verbatim() {
    let (address, server) = scripted_server(vec!["<OK>"]).await;
    let client = AasClient::new(address);

    let result = client.exec_command("Save(Overwrite=True)").await.unwrap();
    assert_eq!(result, "<OK>");
    assert_eq!(server.await.unwrap(), vec!["Save(Overwrite=True)"]);
}

#[tokio::test]
async fn plain_result_text_is_returned_verbatim() {
    let (address, server) = scripted_server(vec!["[<System: Static Structural>]"]).await;
    let client = AasClient::new(address);

    let result = client.exec_command("systems=GetAllSystems()").await.unwrap();
    assert_eq!(result, "[<System: Static Structural>]");
    server.await.unwrap();
}

#[tokio::test]
async fn recognized_fault_kind_raises_typed_error() {
    let (address, server) =
        scripted_server(vec!["CommandFailedException: Save path does not exist"]).await;
    let client = AasClient::new(address);

    let err = client.exec_command("Save(Overwrite=True)").await.unwrap_err();
    match err {
        TransportError::Remote(fault) => {
            assert_eq!(fault.kind, FaultKind::CommandFailed);
            assert_eq!(fault.message, "Save path does not exist");
        }
        other => panic!("expected remote fault, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn unrecognized_fault_kind_raises_runtime_with_full_text() {
    let response = "ImportException: no module named Ansys";
    let (address, server) = scripted_server(vec![response]).await;
    let client = AasClient::new(address);

    let err = client.exec_command("import Ansys").await.unwrap_err();
    match err {
        TransportError::Remote(fault) => {
            assert_eq!(fault.kind, FaultKind::Runtime);
            assert_eq!(fault.message, response);
        }
        other => panic!("expected remote fault, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn query_variable_issues_two_commands_and_strips_prefix() {
    // 13-character protocol prefix ahead of the payload.
    let (address, server) = scripted_server(vec!["<OK>", "#QUERYRESULT#[<System: SYS>]"]).await;
    let client = AasClient::new(address);

    let value = client.query_variable("systems").await.unwrap();
    assert_eq!(value, "[<System: SYS>]");

    let commands = server.await.unwrap();
    assert_eq!(
        commands,
        vec![
            "__variable__=systems.__repr__()".to_string(),
            "Query,__variable__".to_string(),
        ]
    );
}

#[tokio::test]
async fn query_response_shorter_than_prefix_yields_empty_string() {
    let (address, server) = scripted_server(vec!["<OK>", "short"]).await;
    let client = AasClient::new(address);

    let value = client.query_variable("x").await.unwrap();
    assert_eq!(value, "");
    server.await.unwrap();
}

#[tokio::test]
async fn failed_assignment_stops_query_before_second_command() {
    let (address, server) =
        scripted_server(vec!["UnboundNameException: name 'missing' is not defined"]).await;
    let client = AasClient::new(address);

    let err = client.query_variable("missing").await.unwrap_err();
    match err {
        TransportError::Remote(fault) => assert_eq!(fault.kind, FaultKind::UnboundName),
        other => panic!("expected remote fault, got {other:?}"),
    }
    // Only the assignment reached the server.
    assert_eq!(server.await.unwrap().len(), 1);
}

#[tokio::test]
async fn connect_failure_is_distinct_from_io_failure() {
    // A fresh ephemeral listener dropped immediately leaves a port with no
    // server behind it.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = AasClient::new(Address::new("127.0.0.1", port));
    let err = client.exec_command("Exit").await.unwrap_err();
    assert!(matches!(err, TransportError::Connect(_)), "got {err:?}");
}

#[tokio::test]
async fn exchange_timeout_surfaces_as_timeout_error() {
    // Accept the connection but never respond.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(stream);
    });

    let client = AasClient::new(Address::new("127.0.0.1", port))
        .with_timeout(Duration::from_millis(100));
    let err = client.exec_command("Exit").await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout), "got {err:?}");
    server.abort();
}
