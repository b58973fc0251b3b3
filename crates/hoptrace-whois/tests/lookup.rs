use hoptrace_whois::{Whois, WhoisInfo};
use std::io::{BufRead, BufReader, Write};
use std::net::{Ipv4Addr, TcpListener};
use std::thread;
use std::time::Duration;

const ADDR: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);

/// Serve one canned response per connection and return the queries received.
fn serve(listener: TcpListener, responses: Vec<&'static str>) -> thread::JoinHandle<Vec<String>> {
    thread::spawn(move || {
        responses
            .into_iter()
            .map(|response| {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream);
                let mut query = String::new();
                reader.read_line(&mut query).unwrap();
                reader.get_mut().write_all(response.as_bytes()).unwrap();
                query
            })
            .collect()
    })
}

fn listen() -> (TcpListener, u16) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

#[test]
fn test_lookup_follows_referral() -> anyhow::Result<()> {
    let (listener, port) = listen();
    let server = serve(
        listener,
        vec![
            "% IANA WHOIS server\r\n\r\nwhois:        127.0.0.1\r\n",
            "NetName:        GOGL\r\nOriginAS:       AS15169\r\nCountry:        US\r\n",
        ],
    );
    let whois = Whois::new("127.0.0.1", port, Duration::from_secs(2));
    let info = whois.lookup(ADDR)?;
    assert_eq!(
        WhoisInfo {
            netname: Some("GOGL".to_string()),
            origin: Some("15169".to_string()),
            country: Some("US".to_string()),
        },
        info
    );
    let queries = server.join().unwrap();
    assert_eq!(vec!["8.8.8.8\r\n", "8.8.8.8\r\n"], queries);
    Ok(())
}

#[test]
fn test_lookup_without_referral() -> anyhow::Result<()> {
    let (listener, port) = listen();
    let server = serve(listener, vec!["% This query returned 0 objects.\r\n"]);
    let whois = Whois::new("127.0.0.1", port, Duration::from_secs(2));
    let info = whois.lookup(ADDR)?;
    assert!(info.is_empty());
    assert_eq!(1, server.join().unwrap().len());
    Ok(())
}

#[test]
fn test_lookup_connection_refused() {
    let (listener, port) = listen();
    drop(listener);
    let whois = Whois::new("127.0.0.1", port, Duration::from_millis(200));
    assert!(whois.lookup(ADDR).is_err());
}
