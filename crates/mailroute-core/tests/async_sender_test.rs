mod common;

use common::{collect, config, recording, request};
use mailroute_core::{
    queue_capacity, AsyncSender, DispatchError, HandlerError, HandlerResult, MailApi,
    SendRequest, Sender, DEFAULT_QUEUE_CAPACITY,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

#[tokio::test]
async fn dispatches_in_enqueue_order() {
    let sender = AsyncSender::new(config());
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    sender.register_mail_type("T".into(), recording("T", seen_tx));
    let _worker = sender.start().unwrap();

    for label in ["A", "B", "C"] {
        sender.send(request("T", label)).await.unwrap();
    }

    assert_eq!(collect(&mut seen_rx, 3).await, vec!["T:A", "T:B", "T:C"]);
}

#[tokio::test]
async fn concurrent_producers_dispatch_in_enqueue_order() {
    let sender = AsyncSender::new(config().async_buffer_size(2));
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    sender.register_mail_type("T".into(), recording("T", seen_tx));
    let _worker = sender.start().unwrap();

    // The lock is held across each send so the log matches queue order.
    let enqueued = Arc::new(Mutex::new(Vec::new()));
    let producers: Vec<_> = (0..4)
        .map(|p| {
            let sender = sender.clone();
            let enqueued = enqueued.clone();
            tokio::spawn(async move {
                for i in 0..5 {
                    let label = format!("{}-{}", p, i);
                    let mut log = enqueued.lock().await;
                    sender.send(request("T", &label)).await.unwrap();
                    log.push(format!("T:{}", label));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }

    let seen = collect(&mut seen_rx, 20).await;
    assert_eq!(seen, *enqueued.lock().await);

    for p in 0..4 {
        let prefix = format!("T:{}-", p);
        let order: Vec<&String> = seen.iter().filter(|s| s.starts_with(&prefix)).collect();
        let expected: Vec<String> = (0..5).map(|i| format!("T:{}-{}", p, i)).collect();
        assert_eq!(order, expected.iter().collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn full_queue_holds_extra_producer_until_worker_starts() {
    let sender = AsyncSender::new(config().async_buffer_size(2));
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    sender.register_mail_type("T".into(), recording("T", seen_tx));

    let producers: Vec<_> = (0..3)
        .map(|p| {
            let sender = sender.clone();
            tokio::spawn(async move { sender.send(request("T", &p.to_string())).await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(50)).await;
    let finished = producers.iter().filter(|p| p.is_finished()).count();
    assert_eq!(finished, 2, "only the queue capacity may be accepted without a worker");

    let _worker = sender.start().unwrap();
    for producer in producers {
        let sent = tokio::time::timeout(Duration::from_secs(5), producer)
            .await
            .expect("producer still blocked after worker start")
            .unwrap();
        assert!(sent.is_ok());
    }

    let mut seen = collect(&mut seen_rx, 3).await;
    seen.sort();
    assert_eq!(seen, vec!["T:0", "T:1", "T:2"]);
}

#[tokio::test]
async fn single_slot_queue_delivers_both_sends_once_in_order() {
    let sender = AsyncSender::new(config().async_buffer_size(1));
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    sender.register_mail_type("T".into(), recording("T", seen_tx));
    let _worker = sender.start().unwrap();

    let (first, second) = tokio::join!(
        sender.send(request("T", "first")),
        sender.send(request("T", "second")),
    );
    first.unwrap();
    second.unwrap();

    assert_eq!(collect(&mut seen_rx, 2).await, vec!["T:first", "T:second"]);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(seen_rx.try_recv().is_err(), "a request was delivered twice");
}

#[test]
fn capacity_defaults_to_ten() {
    assert_eq!(DEFAULT_QUEUE_CAPACITY, 10);
    assert_eq!(queue_capacity(&config()), 10);
    assert_eq!(queue_capacity(&config().async_buffer_size(-4)), 10);
    assert_eq!(queue_capacity(&config().async_buffer_size(3)), 3);

    assert_eq!(AsyncSender::new(config()).capacity(), 10);
    assert_eq!(AsyncSender::new(config().async_buffer_size(1)).capacity(), 1);
}

async fn panicking(_api: MailApi, _request: SendRequest) -> HandlerResult {
    panic!("handler bug")
}

#[tokio::test]
async fn failures_do_not_stop_the_worker() {
    let sender = AsyncSender::new(config());
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    sender.register("failing", |_api, _request| async {
        Err::<(), HandlerError>("connection refused".into())
    });
    sender.register("panicking", panicking);
    sender.register_mail_type("T".into(), recording("T", seen_tx));
    let _worker = sender.start().unwrap();

    sender.send(request("failing", "1")).await.unwrap();
    sender.send(request("panicking", "2")).await.unwrap();
    sender.send(request("unregistered", "3")).await.unwrap();
    sender.send(request("T", "4")).await.unwrap();

    assert_eq!(collect(&mut seen_rx, 1).await, vec!["T:4"]);
}

#[tokio::test]
async fn registration_after_start_is_visible() {
    let sender = AsyncSender::new(config());
    let _worker = sender.start().unwrap();

    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    sender.register_mail_type("late".into(), recording("late", seen_tx));
    sender.send(request("late", "1")).await.unwrap();

    assert_eq!(collect(&mut seen_rx, 1).await, vec!["late:1"]);
}

#[tokio::test]
async fn second_start_is_rejected() {
    let sender = AsyncSender::new(config());
    let _worker = sender.start().unwrap();

    assert!(matches!(sender.start(), Err(DispatchError::AlreadyStarted)));
    assert!(matches!(sender.clone().start(), Err(DispatchError::AlreadyStarted)));
}

#[tokio::test]
async fn worker_drains_queue_after_senders_drop() {
    let sender = AsyncSender::new(config().async_buffer_size(5));
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    sender.register_mail_type("T".into(), recording("T", seen_tx));

    for label in ["A", "B", "C"] {
        sender.send(request("T", label)).await.unwrap();
    }
    let worker = sender.start().unwrap();
    drop(sender);

    tokio::time::timeout(Duration::from_secs(5), worker.join())
        .await
        .expect("worker did not stop after the queue closed");

    assert_eq!(collect(&mut seen_rx, 3).await, vec!["T:A", "T:B", "T:C"]);
}

#[test]
fn send_fails_once_worker_is_gone() {
    let sender = AsyncSender::new(config());

    let worker_runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    {
        let _guard = worker_runtime.enter();
        sender.start().unwrap();
    }
    drop(worker_runtime);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let result = runtime.block_on(sender.send(request("T", "late")));
    assert!(matches!(result, Err(DispatchError::QueueClosed)));
}
