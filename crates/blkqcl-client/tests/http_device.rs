use std::sync::Arc;
use std::time::Duration;

use blkqcl_client::{
    Authorization, BlkqclClient, ClientConfig, ClientError, CoAdd, ProtocolVersion,
    ScanResolution, SweepScanRequest,
};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

const ACCEPTED: ProtocolVersion = ProtocolVersion::V2016_05;

#[derive(Debug, Clone)]
struct Recorded {
    connection: usize,
    authorization: Option<String>,
    body: String,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

/// A controller that only speaks the 2016-05 schema and requires Basic auth.
async fn spawn_device(credential: Authorization) -> (String, Log) {
    let _ = env_logger::builder().is_test(true).try_init();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let log: Log = Arc::default();
    let server_log = log.clone();
    tokio::spawn(async move {
        let mut connection = 0;
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, connection, credential.clone(), server_log.clone()));
            connection += 1;
        }
    });
    (addr, log)
}

async fn serve(stream: TcpStream, connection: usize, credential: Authorization, log: Log) {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);
    while let Some((authorization, body)) = read_request(&mut reader).await {
        log.lock().await.push(Recorded {
            connection,
            authorization: authorization.clone(),
            body: body.clone(),
        });
        let (status, reason, reply) = if authorization.as_deref() != Some(credential.header_value())
        {
            (401, "Unauthorized", String::new())
        } else if !body.contains(ACCEPTED.namespace()) {
            (500, "Internal Server Error", fault("Unsupported schema"))
        } else if body.contains("<blk:GetDeviceName/>") {
            (200, "OK", envelope("<blk:GetDeviceNameResponse>Bench 4</blk:GetDeviceNameResponse>"))
        } else if body.contains("<blk:SweepScan>") {
            (
                200,
                "OK",
                envelope(
                    "<blk:SweepScanResponse><blk:Spectrum>\
                     <blk:Measurement waveNumber=\"1000.0\" intensity=\"0.25\"/>\
                     <blk:Measurement waveNumber=\"1010.0\" intensity=\"0.5\"/>\
                     </blk:Spectrum></blk:SweepScanResponse>",
                ),
            )
        } else {
            (500, "Internal Server Error", fault("Unknown command"))
        };
        let head = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\n\r\n",
            reply.len()
        );
        if write.write_all(head.as_bytes()).await.is_err()
            || write.write_all(reply.as_bytes()).await.is_err()
        {
            return;
        }
    }
}

async fn read_request<R: tokio::io::AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Option<(Option<String>, String)> {
    let mut line = String::new();
    if reader.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    assert!(line.starts_with("POST / HTTP/1.1"), "request line {line:?}");
    let mut authorization = None;
    let mut length = 0;
    loop {
        line.clear();
        reader.read_line(&mut line).await.ok()?;
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        let (name, value) = header.split_once(':')?;
        match name.trim().to_ascii_lowercase().as_str() {
            "authorization" => authorization = Some(value.trim().to_owned()),
            "content-length" => length = value.trim().parse().ok()?,
            _ => {}
        }
    }
    let mut body = vec![0; length];
    reader.read_exact(&mut body).await.ok()?;
    Some((authorization, String::from_utf8(body).ok()?))
}

fn envelope(body: &str) -> String {
    format!(
        "<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\" \
         xmlns:blk=\"{}\"><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>",
        ACCEPTED.namespace()
    )
}

fn fault(message: &str) -> String {
    format!(
        "<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <soapenv:Body><soapenv:Fault><faultcode>soapenv:Client</faultcode>\
         <faultstring>{message}</faultstring></soapenv:Fault></soapenv:Body></soapenv:Envelope>"
    )
}

fn sweep_scan() -> SweepScanRequest {
    SweepScanRequest {
        start: 1000.0,
        end: 1010.0,
        rate: 100.0,
        resolution: ScanResolution::WaveNumbers(10.0),
        co_add: CoAdd {
            scans_per_spectrum: 1,
            delay_between: Duration::ZERO,
        },
    }
}

#[tokio::test]
async fn negotiates_over_keep_alive_with_basic_auth() {
    let credential = Authorization::basic("operator", "secret").unwrap();
    let (addr, log) = spawn_device(credential.clone()).await;

    let config = ClientConfig::builder(addr)
        .with_credentials("operator", "secret")
        .build()
        .unwrap();
    let mut client = BlkqclClient::connect(config).await.unwrap();
    assert_eq!(client.version(), ACCEPTED);
    assert!(!client.transport().is_pipelined());
    assert_eq!(client.get_device_name().await.unwrap(), "Bench 4");

    let log = log.lock().await;
    assert_eq!(log.len(), 3);
    assert!(log[0].body.contains(ProtocolVersion::V2017_04.namespace()));
    assert!(log[1].body.contains(ACCEPTED.namespace()));
    assert!(log.iter().all(|r| r.connection == 0));
    assert!(log
        .iter()
        .all(|r| r.authorization.as_deref() == Some(credential.header_value())));
}

#[tokio::test]
async fn missing_credentials_surface_http_status() {
    let (addr, log) = spawn_device(Authorization::basic("operator", "secret").unwrap()).await;

    let config = ClientConfig::builder(addr).build().unwrap();
    let err = BlkqclClient::connect(config).await.unwrap_err();
    assert!(matches!(err, ClientError::HttpStatus(ref e) if e.status == 401));
    assert_eq!(log.lock().await.len(), 1);
}

#[tokio::test]
async fn pipelined_client_primes_a_fresh_connection() {
    let (addr, log) = spawn_device(Authorization::basic("operator", "secret").unwrap()).await;

    let config = ClientConfig::builder(addr)
        .with_credentials("operator", "secret")
        .with_pipelining(2)
        .with_response_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let mut client = BlkqclClient::connect(config).await.unwrap();
    assert!(client.transport().is_pipelined());

    for _ in 0..2 {
        let spectrum = client.sweep_scan(&sweep_scan()).await.unwrap();
        assert_eq!(spectrum.len(), 2);
        assert_eq!(spectrum.get(1010.0), Some(0.5));
    }
    client.close().await;

    let log = log.lock().await;
    let negotiation: Vec<_> = log.iter().filter(|r| r.connection == 0).collect();
    assert_eq!(negotiation.len(), 2);
    assert!(negotiation.iter().all(|r| r.body.contains("<blk:GetDeviceName/>")));

    let scans: Vec<_> = log.iter().filter(|r| r.connection == 1).collect();
    assert!(scans.len() >= 2, "only {} pipelined requests seen", scans.len());
    assert!(scans.iter().all(|r| r.body == scans[0].body));
    assert!(scans[0].body.contains("<blk:SweepScan>"));
}
