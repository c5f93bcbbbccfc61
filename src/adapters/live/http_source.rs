//! Live adapter that downloads images over HTTP(S).

use reqwest::Client;
use tracing::debug;

use crate::error::ComposeError;
use crate::ports::{FetchedImage, ImageSource, PortFuture};

/// Fetches images with a plain GET.
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    /// Create a source with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create a source over an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpImageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, url: &str) -> PortFuture<'_, FetchedImage> {
        let url = url.to_string();
        Box::pin(async move {
            let response = self.client.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ComposeError::Fetch(format!("{url} returned {status}")));
            }

            let data = response.bytes().await?.to_vec();
            let format = image::guess_format(&data)
                .map_err(|_| ComposeError::Fetch(format!("{url} is not a recognized image")))?;
            debug!(url = %url, ?format, bytes = data.len(), "image fetched");
            Ok(FetchedImage { data })
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    #[tokio::test]
    async fn fetches_image_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/person.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG))
            .mount(&server)
            .await;

        let image =
            HttpImageSource::new().fetch(&format!("{}/person.jpg", server.uri())).await.unwrap();
        assert_eq!(image.data, JPEG);
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/gone.jpg", server.uri());
        let err = HttpImageSource::new().fetch(&url).await.unwrap_err();
        assert!(matches!(err, ComposeError::Fetch(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn non_image_body_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let url = format!("{}/page", server.uri());
        let err = HttpImageSource::new().fetch(&url).await.unwrap_err();
        assert!(err.to_string().contains("not a recognized image"));
    }
}
