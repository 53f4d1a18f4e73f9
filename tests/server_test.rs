/*!
 * Server Integration Tests
 * End-to-end runs in sequential and parallel mode, including shutdown drain
 */

use feed_server::{
    Feed, FeedItem, JsonLineSink, MemorySink, Request, Response, Server, ServerConfig,
};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::io::Cursor;
use std::time::Duration;

fn input(requests: &[Request]) -> Cursor<String> {
    let mut out = String::new();
    for request in requests {
        out.push_str(&request.encode().unwrap());
        out.push('\n');
    }
    Cursor::new(out)
}

fn adds_then_done(count: i64) -> Vec<Request> {
    let mut requests: Vec<_> = (0..count)
        .map(|i| Request::add(i, format!("post {}", i), i as f64))
        .collect();
    requests.push(Request::done(count));
    requests
}

#[test]
fn test_parallel_thousand_adds_repeated() {
    for run in 0..5 {
        let server = Server::new(ServerConfig::parallel(4));
        let sink = MemorySink::new();

        let summary = server.run(input(&adds_then_done(1_000)), &sink).unwrap();

        let feed = server.timeline().feed_data();
        assert_eq!(feed.len(), 1_000, "run {}", run);
        let unique: HashSet<_> = feed.iter().map(|i| i.timestamp).collect();
        assert_eq!(unique.len(), 1_000, "run {}", run);

        let responses = sink.take();
        assert_eq!(responses.len(), 1_000);
        assert!(responses.iter().all(|r| r.success && r.feed.is_none()));
        let ids: HashSet<_> = responses.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 1_000);

        assert_eq!(summary.processed, 1_000);
        assert_eq!(summary.received, 1_001);
        assert_eq!(summary.workers, 4);
    }
}

#[test]
fn test_shutdown_waits_for_every_worker() {
    // Many workers and a slow idle poll: the DONE worker finishes long before
    // the rest have drained, so returning early would lose posts
    let config = ServerConfig::parallel(8).with_idle_backoff(Duration::from_millis(5));
    let server = Server::new(config);
    let sink = MemorySink::new();

    server.run(input(&adds_then_done(2_000)), &sink).unwrap();

    assert_eq!(server.timeline().len(), 2_000);
    assert_eq!(sink.len(), 2_000);
}

#[test]
fn test_parallel_end_of_input_without_done() {
    let server = Server::new(ServerConfig::parallel(2));
    let sink = MemorySink::new();
    let requests: Vec<_> = (0..50).map(|i| Request::add(i, "", i as f64)).collect();

    let summary = server.run(input(&requests), &sink).unwrap();
    assert_eq!(summary.processed, 50);
    assert_eq!(server.timeline().len(), 50);
}

#[test]
fn test_sequential_json_output() {
    let server = Server::new(ServerConfig::sequential());
    let sink = JsonLineSink::new(Vec::new());
    let requests = vec![
        Request::add(1, "hello", 100.0),
        Request::add(2, "world", 200.0),
        Request::contains(3, 100.0),
        Request::remove(4, 100.0),
        Request::remove(5, 100.0),
        Request::feed(6),
        Request::done(7),
        Request::add(8, "late", 300.0),
    ];

    let summary = server.run(input(&requests), &sink).unwrap();
    assert_eq!(summary.processed, 6);
    assert_eq!(summary.workers, 0);

    let out = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"{"Success":true,"ID":1}"#,
            r#"{"Success":true,"ID":2}"#,
            r#"{"Success":true,"ID":3}"#,
            r#"{"Success":true,"ID":4}"#,
            r#"{"Success":false,"ID":5}"#,
            r#"{"Success":true,"ID":6,"feed":[{"body":"world","timestamp":200}]}"#,
        ]
    );
    assert!(!server.timeline().contains(300.0));
}

#[test]
fn test_malformed_and_unknown_lines_are_skipped() {
    let raw = concat!(
        "{\"command\":\"ADD\",\"id\":1,\"body\":\"a\",\"timestamp\":10}\n",
        "{\"command\":\"ADD\",\"id\":\n",
        "garbage\n",
        "{\"command\":\"SHOUT\",\"id\":2,\"body\":\"b\",\"timestamp\":20}\n",
        "{\"command\":\"FEED\",\"id\":3}\n",
        "{\"command\":\"DONE\",\"id\":4}\n",
    );

    // A single consumer keeps the FEED behind the ADD
    for config in [ServerConfig::sequential(), ServerConfig::parallel(1)] {
        let server = Server::new(config);
        let sink = MemorySink::new();
        server.run(Cursor::new(raw), &sink).unwrap();

        let mut responses = sink.take();
        responses.sort_by_key(|r| r.id);
        assert_eq!(
            responses,
            vec![
                Response::new(1, true),
                Response::with_feed(3, vec![FeedItem::new("a", 10)]),
            ]
        );
    }
}

#[test]
fn test_parallel_feed_snapshots_are_sorted() {
    let mut requests = Vec::new();
    for i in 0..300 {
        requests.push(Request::add(i, "", ((i * 7919) % 1_000) as f64));
        if i % 25 == 0 {
            requests.push(Request::feed(10_000 + i));
        }
    }
    requests.push(Request::done(-1));

    let server = Server::new(ServerConfig::parallel(4).with_max_readers(2));
    let sink = MemorySink::new();
    server.run(input(&requests), &sink).unwrap();

    for response in sink.take() {
        if let Some(feed) = response.feed {
            assert!(feed.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        }
    }
    assert_eq!(server.timeline().len(), 300);
}
