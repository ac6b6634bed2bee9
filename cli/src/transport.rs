//! Blocking HTTP transport backed by ureq.

use std::time::Duration;

use library_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// 4xx/5xx responses are returned as data so the core client interprets
    /// the status itself. Without a timeout a stalled request blocks until
    /// the server answers.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = &self.agent;
        let result = match req.method {
            HttpMethod::Get => with_headers(agent.get(&req.url), &req.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(agent.post(&req.url), &req.headers);
                match &req.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(agent.put(&req.url), &req.headers);
                match &req.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(HttpResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use library_core::LibraryClient;

    fn start_server() -> String {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        format!("http://{addr}")
    }

    #[test]
    fn non_success_status_is_returned_as_data() {
        let base_url = start_server();
        let transport = UreqTransport::new(Some(Duration::from_secs(5)));
        let client = LibraryClient::new(&base_url);

        let response = transport
            .execute(client.build_return_borrowing(42).unwrap())
            .unwrap();
        assert_eq!(response.status, 404);
        assert!(response.body.contains("Borrowing with ID 42 not found."));
    }

    #[test]
    fn refused_connection_is_a_transport_error() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let transport = UreqTransport::new(Some(Duration::from_secs(5)));
        let client = LibraryClient::new(&format!("http://{addr}"));

        let err = transport.execute(client.build_list_books()).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn json_body_is_sent_with_request_headers() {
        let base_url = start_server();
        let transport = UreqTransport::new(None);
        let client = LibraryClient::new(&base_url);
        let input = library_core::CreateCategory { nama: "Puisi".into() };

        let response = transport
            .execute(client.build_create_category(&input).unwrap())
            .unwrap();
        assert_eq!(response.status, 201);
        let category = client.parse_create_category(response).unwrap();
        assert_eq!(category.nama, "Puisi");
    }

    #[test]
    fn configured_timeout_ends_a_stalled_request() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering.
        std::thread::spawn(move || {
            let held: Vec<_> = listener.incoming().take(1).collect();
            std::thread::sleep(Duration::from_secs(5));
            drop(held);
        });
        let transport = UreqTransport::new(Some(Duration::from_millis(200)));
        let client = LibraryClient::new(&format!("http://{addr}"));

        let err = transport.execute(client.build_list_books()).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
