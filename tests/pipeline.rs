//! End-to-end tests: HTTP → relay → ingest → store.

use std::time::Duration;

use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

mod common;

#[tokio::test]
async fn index_is_served_as_html() {
    let site = common::site_with_pages();
    let service = common::start_service(site.path()).await;

    let res = common::client()
        .get(format!("http://{}/", service.http_addr()))
        .send()
        .await
        .expect("front end unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/html");
    assert_eq!(res.text().await.unwrap(), "<form method=\"post\"></form>");

    service.stop().await.unwrap();
}

#[tokio::test]
async fn static_asset_and_missing_file() {
    let site = common::site_with_pages();
    let service = common::start_service(site.path()).await;
    let client = common::client();

    let css = client
        .get(format!("http://{}/style.css", service.http_addr()))
        .send()
        .await
        .unwrap();
    assert_eq!(css.status(), StatusCode::OK);
    assert_eq!(css.headers()["content-type"], "text/css");

    let missing = client
        .get(format!("http://{}/does-not-exist.xyz", service.http_addr()))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.text().await.unwrap(), "<p>Nothing here</p>");

    service.stop().await.unwrap();
}

#[tokio::test]
async fn submission_is_redirected_and_persisted() {
    let site = common::site_with_pages();
    let store_path = common::store_path(site.path());
    std::fs::create_dir_all(store_path.parent().unwrap()).unwrap();
    std::fs::write(&store_path, r#"{"2000-01-01 00:00:00.000000":{"name":"Old"}}"#).unwrap();

    let service = common::start_service(site.path()).await;

    let res = common::client()
        .post(format!("http://{}/", service.http_addr()))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=Ada&msg=hi+there")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "/message.html");

    let doc = common::wait_for_entries(&store_path, 2).await;
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.get("2000-01-01 00:00:00.000000").unwrap()["name"], "Old");

    let (key, record) = doc.iter().last().unwrap();
    assert_ne!(key, "2000-01-01 00:00:00.000000");
    assert_eq!(record.len(), 2);
    assert_eq!(record["name"], "Ada");
    assert_eq!(record["msg"], "hi there");

    service.stop().await.unwrap();
}

#[tokio::test]
async fn malformed_datagram_is_dropped_and_loop_continues() {
    let site = common::site_with_pages();
    let store_path = common::store_path(site.path());
    let service = common::start_service(site.path()).await;

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.send_to(b"foo", service.ingest_addr()).await.unwrap();
    sender.send_to(b"a=1&b", service.ingest_addr()).await.unwrap();
    sender.send_to(b"after=bad", service.ingest_addr()).await.unwrap();

    common::wait_for_entries(&store_path, 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let doc = form_relay::Store::new(&store_path).load().await.unwrap();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.iter().next().unwrap().1["after"], "bad");

    service.stop().await.unwrap();
}

#[tokio::test]
async fn empty_post_redirects_without_storing() {
    let site = common::site_with_pages();
    let store_path = common::store_path(site.path());
    let service = common::start_service(site.path()).await;

    let res = common::client()
        .post(format!("http://{}/message.html", service.http_addr()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let doc = form_relay::Store::new(&store_path).load().await.unwrap();
    assert!(doc.is_empty());

    service.stop().await.unwrap();
}

#[tokio::test]
async fn aborted_body_is_bad_request_and_not_stored() {
    let site = common::site_with_pages();
    let store_path = common::store_path(site.path());
    let service = common::start_service(site.path()).await;

    let mut stream = TcpStream::connect(service.http_addr()).await.unwrap();
    stream
        .write_all(b"POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 50\r\n\r\nname=")
        .await
        .unwrap();
    stream.shutdown().await.unwrap();

    let mut reply = [0u8; 512];
    let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut reply))
        .await
        .unwrap()
        .unwrap();
    let reply = String::from_utf8_lossy(&reply[..n]);
    assert!(reply.starts_with("HTTP/1.1 400"), "unexpected reply: {reply}");

    tokio::time::sleep(Duration::from_millis(200)).await;
    let doc = form_relay::Store::new(&store_path).load().await.unwrap();
    assert!(doc.is_empty());

    service.stop().await.unwrap();
}

#[tokio::test]
async fn concurrent_submissions_all_survive() {
    let site = common::site_with_pages();
    let store_path = common::store_path(site.path());
    let service = common::start_service(site.path()).await;
    let client = common::client();

    let mut requests = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        let url = format!("http://{}/", service.http_addr());
        requests.push(tokio::spawn(async move {
            client.post(url).body(format!("n={i}")).send().await.unwrap().status()
        }));
    }
    for request in requests {
        assert_eq!(request.await.unwrap(), StatusCode::FOUND);
    }

    let doc = common::wait_for_entries(&store_path, 10).await;
    let mut values: Vec<u32> = doc.iter().map(|(_, r)| r["n"].parse().unwrap()).collect();
    values.sort_unstable();
    assert_eq!(values, (0..10).collect::<Vec<_>>());

    service.stop().await.unwrap();
}

#[tokio::test]
async fn stop_closes_http_listener() {
    let site = common::site_with_pages();
    let service = common::start_service(site.path()).await;
    let addr = service.http_addr();

    service.stop().await.unwrap();

    let result = common::client()
        .get(format!("http://{addr}/"))
        .timeout(Duration::from_secs(2))
        .send()
        .await;
    assert!(result.is_err());
}
