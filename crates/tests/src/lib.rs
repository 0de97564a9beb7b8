//! # Integration Tests
//!
//! End-to-end tests driving real sockets through the whole chain:
//! listener, parser, dispatcher, queuing handlers and sinks.

#[cfg(test)]
mod contract_tests {
    use contracts::{Facility, Priority, Severity, DEFAULT_PRIORITY};

    #[test]
    fn test_default_priority_is_user_notice() {
        assert_eq!(DEFAULT_PRIORITY.value(), 13);
        assert_eq!(DEFAULT_PRIORITY.facility(), Facility::User);
        assert_eq!(DEFAULT_PRIORITY.severity(), Severity::Notice);
        assert_eq!(
            Priority::from_parts(Facility::Auth, Severity::Crit).value(),
            34
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::{Datelike, Local, Timelike};
    use contracts::{
        ContractError, Facility, MissingPriority, Record, RecordSink, Severity, Source,
    };
    use dispatcher::{create_dispatcher, Dispatcher, QueueConfig, QueueConsumer, QueuingHandler};
    use ingestion::Server;
    use parser::Parser;
    use tokio::net::{UdpSocket, UnixDatagram};
    use tokio::task::JoinHandle;
    use tokio::time::{sleep, timeout};

    const CANONICAL: &str = "<34>Oct 11 22:14:15 mymachine su: 'su root' failed for lonvick on /dev/pts/8";

    /// Sink that keeps every record it is given
    #[derive(Clone, Default)]
    struct CollectSink {
        records: Arc<Mutex<Vec<Record>>>,
    }

    impl CollectSink {
        fn contents(&self) -> Vec<String> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.content.clone())
                .collect()
        }
    }

    impl RecordSink for CollectSink {
        fn name(&self) -> &str {
            "collect"
        }

        async fn write(&mut self, record: &Record) -> Result<(), ContractError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    /// Drain a consumer until end-of-stream, then acknowledge
    fn drain(consumer: QueueConsumer) -> JoinHandle<Vec<Arc<Record>>> {
        tokio::spawn(async move {
            let mut records = Vec::new();
            while let Some(record) = consumer.dequeue().await {
                records.push(record);
            }
            consumer.signal_done();
            records
        })
    }

    async fn wait_until(condition: impl Fn() -> bool) {
        timeout(Duration::from_secs(5), async {
            while !condition() {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    fn received(server: &Server) -> u64 {
        server
            .metrics()
            .iter()
            .map(|(_, s)| s.datagrams_received)
            .sum()
    }

    #[tokio::test]
    async fn test_e2e_udp_canonical_message() {
        let (queue, consumer) = QueuingHandler::new("q", QueueConfig::new(16));
        let dispatcher = Arc::new(Dispatcher::builder().queuing(queue).build());
        let mut server = Server::new(Arc::clone(&dispatcher), Parser::default());
        server.listen_addr("127.0.0.1:0").await.unwrap();
        let addr = server.local_addrs()[0];
        let collector = drain(consumer);

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(CANONICAL.as_bytes(), addr).await.unwrap();
        wait_until(|| received(&server) == 1).await;

        server.shutdown().await;
        let records = collector.await.unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.source, Source::Udp(client.local_addr().unwrap()));
        assert_eq!(record.net_addr(), "127.0.0.1");
        assert_eq!(record.facility, Facility::Auth);
        assert_eq!(record.severity, Severity::Crit);
        assert_eq!(record.hostname(), Some("mymachine"));
        assert_eq!(record.tag, "su");
        assert_eq!(
            record.content,
            ": 'su root' failed for lonvick on /dev/pts/8"
        );

        let timestamp = record.device_timestamp().unwrap();
        assert_eq!((timestamp.month(), timestamp.day()), (10, 11));
        assert_eq!(
            (timestamp.hour(), timestamp.minute(), timestamp.second()),
            (22, 14, 15)
        );
        assert!(record.received_at <= Local::now());

        let dispatch = dispatcher.dispatch_metrics();
        assert_eq!(dispatch.dispatched, 1);
        assert_eq!(dispatch.absorbed, 1);
        assert_eq!(dispatch.unhandled, 0);
    }

    #[tokio::test]
    async fn test_e2e_unixgram() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.sock");

        let (queue, consumer) = QueuingHandler::new("q", QueueConfig::new(16));
        let dispatcher = Arc::new(Dispatcher::builder().queuing(queue).build());
        let mut server = Server::new(dispatcher, Parser::default());
        server.listen_addr(path.to_str().unwrap()).await.unwrap();
        assert!(path.exists());
        let collector = drain(consumer);

        let client = UnixDatagram::unbound().unwrap();
        client
            .send_to(b"<30>Oct 11 02:03:04 host cron[99]: job done\n", &path)
            .await
            .unwrap();
        wait_until(|| received(&server) == 1).await;

        server.shutdown().await;
        assert!(!path.exists());

        let records = collector.await.unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        // Unbound senders are reported as the listening socket
        assert_eq!(record.source, Source::Unix(path.clone()));
        assert_eq!(record.net_addr(), path.display().to_string());
        assert_eq!(record.facility, Facility::Daemon);
        assert_eq!(record.severity, Severity::Info);
        assert_eq!(record.hostname(), Some("host"));
        assert_eq!(record.tag, "cron");
        assert_eq!(record.content, "[99]: job done");
    }

    #[tokio::test]
    async fn test_e2e_concurrent_listeners_no_loss_no_duplicates() {
        const PER_SENDER: usize = 200;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.sock");

        let sink = CollectSink::default();
        let queue = QueuingHandler::spawn(sink.clone(), QueueConfig::new(4 * PER_SENDER));
        let queue_metrics = Arc::clone(queue.metrics());
        let dispatcher = Arc::new(Dispatcher::builder().queuing(queue).build());
        let mut server = Server::new(Arc::clone(&dispatcher), Parser::default());
        server.listen_addr("127.0.0.1:0").await.unwrap();
        server.listen_addr("127.0.0.1:0").await.unwrap();
        server.listen_addr(path.to_str().unwrap()).await.unwrap();
        assert_eq!(server.listener_count(), 3);

        let mut senders = Vec::new();
        for (i, addr) in server.local_addrs().into_iter().enumerate() {
            senders.push(tokio::spawn(async move {
                let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
                for n in 0..PER_SENDER {
                    let msg = format!("<14>app: udp{i}-{n}");
                    client.send_to(msg.as_bytes(), addr).await.unwrap();
                    if n % 25 == 0 {
                        sleep(Duration::from_millis(1)).await;
                    }
                }
            }));
        }
        let unix_path = path.clone();
        senders.push(tokio::spawn(async move {
            let client = UnixDatagram::unbound().unwrap();
            for n in 0..PER_SENDER {
                let msg = format!("<14>app: unix-{n}");
                client.send_to(msg.as_bytes(), &unix_path).await.unwrap();
                if n % 25 == 0 {
                    sleep(Duration::from_millis(1)).await;
                }
            }
        }));
        for sender in senders {
            sender.await.unwrap();
        }

        let total = (3 * PER_SENDER) as u64;
        wait_until(|| received(&server) == total).await;
        server.shutdown().await;

        let contents = sink.contents();
        assert_eq!(contents.len(), 3 * PER_SENDER);
        let unique: HashSet<&String> = contents.iter().collect();
        assert_eq!(unique.len(), contents.len());

        let expected: HashSet<String> = (0..PER_SENDER)
            .flat_map(|n| {
                [
                    format!(": udp0-{n}"),
                    format!(": udp1-{n}"),
                    format!(": unix-{n}"),
                ]
            })
            .collect();
        let expected: HashSet<&String> = expected.iter().collect();
        assert_eq!(unique, expected);

        let snapshot = queue_metrics.snapshot();
        assert_eq!(snapshot.queued_count, total);
        assert_eq!(snapshot.write_count, total);
        assert_eq!(snapshot.bypassed_count, 0);
    }

    #[tokio::test]
    async fn test_e2e_config_to_running_server() {
        let blueprint = config_loader::ConfigLoader::load_from_str(
            r#"
[parser]
missing_priority = "default"

[[listeners]]
address = "127.0.0.1:0"
name = "udp"

[[handlers]]
name = "errors"
kind = "filter"
[handlers.filter]
min_severity = "err"

[[handlers]]
name = "log"
kind = "queue"
queue_capacity = 8
sink = "log"
"#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let dispatcher = Arc::new(create_dispatcher(&blueprint.handlers).await.unwrap());
        let mut server = Server::new(Arc::clone(&dispatcher), Parser::new(&blueprint.parser));
        for listener in &blueprint.listeners {
            server.listen(listener).await.unwrap();
        }
        let addr = server.local_addrs()[0];

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"<11>app: disk failure", addr).await.unwrap();
        client.send_to(b"<14>app: all good", addr).await.unwrap();
        wait_until(|| received(&server) == 2).await;

        server.shutdown().await;
        assert!(dispatcher.is_shut_down());

        let dispatch = dispatcher.dispatch_metrics();
        assert_eq!(dispatch.dispatched, 2);
        assert_eq!(dispatch.absorbed, 2);
        assert_eq!(dispatch.unhandled, 0);

        let handlers = dispatcher.metrics();
        assert_eq!(handlers[0].0, "errors");
        assert_eq!(handlers[0].1.rejected_count, 1);
        assert_eq!(handlers[0].1.forwarded_count, 1);
        assert_eq!(handlers[1].0, "log");
        assert_eq!(handlers[1].1.write_count, 1);

        let listeners = server.metrics();
        assert_eq!(listeners[0].0, "udp");
        assert_eq!(listeners[0].1.unhandled_records, 0);
    }

    #[tokio::test]
    async fn test_e2e_forwarding_and_unhandled_records() {
        let (first, first_consumer) =
            QueuingHandler::new("all", QueueConfig::new(16).forward_on_queue(true));
        let (second, second_consumer) = QueuingHandler::new(
            "sshd",
            QueueConfig::new(16).filter(|r: &Record| r.tag == "sshd"),
        );
        let dispatcher = Arc::new(Dispatcher::builder().queuing(first).queuing(second).build());
        let mut server = Server::new(Arc::clone(&dispatcher), Parser::default());
        server.listen_addr("127.0.0.1:0").await.unwrap();
        let addr = server.local_addrs()[0];
        let first_collector = drain(first_consumer);
        let second_collector = drain(second_consumer);

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"<38>sshd[7]: login", addr).await.unwrap();
        client.send_to(b"<78>cron[8]: tick", addr).await.unwrap();
        wait_until(|| received(&server) == 2).await;

        server.shutdown().await;

        let tags = |records: Vec<Arc<Record>>| -> Vec<String> {
            records.iter().map(|r| r.tag.clone()).collect()
        };
        let mut first_tags = tags(first_collector.await.unwrap());
        first_tags.sort();
        assert_eq!(first_tags, vec!["cron", "sshd"]);
        assert_eq!(tags(second_collector.await.unwrap()), vec!["sshd"]);

        // cron was forwarded by the first handler and refused by the second
        let listener = server.metrics()[0].1;
        assert_eq!(listener.unhandled_records, 1);
        assert_eq!(dispatcher.dispatch_metrics().unhandled, 1);
    }

    #[tokio::test]
    async fn test_e2e_discard_policy() {
        let dispatcher = Arc::new(Dispatcher::builder().build());
        let mut server = Server::new(
            Arc::clone(&dispatcher),
            Parser::with_policy(MissingPriority::Discard),
        );
        server.listen_addr("127.0.0.1:0").await.unwrap();
        let addr = server.local_addrs()[0];

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"no priority here", addr).await.unwrap();
        client.send_to(b"<13>app: kept", addr).await.unwrap();
        wait_until(|| received(&server) == 2).await;
        server.shutdown().await;

        let listener = server.metrics()[0].1;
        assert_eq!(listener.datagrams_discarded, 1);
        // No handlers: the kept record is unhandled
        assert_eq!(listener.unhandled_records, 1);
        assert_eq!(dispatcher.dispatch_metrics().dispatched, 1);
    }

    #[tokio::test]
    async fn test_e2e_socket_path_in_use() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.sock");
        let dispatcher = Arc::new(Dispatcher::builder().build());
        let mut server = Server::new(dispatcher, Parser::default());

        server.listen_addr(path.to_str().unwrap()).await.unwrap();
        assert!(server.listen_addr(path.to_str().unwrap()).await.is_err());
        assert_eq!(server.active_listeners(), 1);

        server.shutdown().await;
        assert!(!Path::new(&path).exists());
    }
}
