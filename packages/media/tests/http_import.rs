//! Import through the real HTTP uploader against a mock storage endpoint

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use ara_editor::{Document, EditSession};
use ara_media::{
    DataTransfer, EditorHost, HttpFetcher, HttpUploader, ImportCandidate, MediaConfig, MediaImporter, Notification,
    NotificationCategory, Notifier, TracingErrorTracker,
};

#[derive(Default)]
struct RecordingNotifier(Mutex<Vec<Notification>>);

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.0.lock().unwrap().push(notification);
    }
}

fn png() -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::new_rgba8(16, 9)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

fn importer(server_url: &str, notifier: Arc<RecordingNotifier>) -> anyhow::Result<MediaImporter> {
    let config = MediaConfig {
        upload_url: format!("{server_url}/api/files"),
        public_path: "https://cdn.test/".to_string(),
        ..MediaConfig::default()
    };

    Ok(MediaImporter::new(
        config.clone(),
        Arc::new(HttpUploader::new(&config)?),
        Arc::new(HttpFetcher::new(&config)?),
        notifier,
        Arc::new(TracingErrorTracker),
    ))
}

#[tokio::test]
async fn test_upload_and_insert() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/files")
        .with_status(200)
        .with_body("2024/05/café.png")
        .expect(1)
        .create_async()
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut importer = importer(&server.url(), notifier.clone())?;
    let mut host = EditorHost::new(EditSession::new("notes", Document::from_paragraphs(["Contrast issue"])));

    let file = ImportCandidate::local("café.png", "image/png", png());
    assert!(importer.handle_data_transfer(&mut host, DataTransfer::files(vec![file]), 16));
    importer.run_until_idle(&mut host).await;

    mock.assert_async().await;

    let images: Vec<_> = host.document().images().collect();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].src, "https://cdn.test/2024/05/café.png");
    assert_eq!(images[0].alt, "café.png");
    assert_eq!((images[0].width, images[0].height), (16, 9));
    assert!(host.placeholders().is_empty());
    assert!(notifier.0.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_server_size_rejection() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/files")
        .with_status(422)
        .with_body(r#"{"message":"expected size <= 2000000"}"#)
        .create_async()
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut importer = importer(&server.url(), notifier.clone())?;
    let mut host = EditorHost::new(EditSession::new("notes", Document::from_paragraphs(["notes"])));

    let file = ImportCandidate::local("a.png", "image/png", png());
    importer.handle_data_transfer(&mut host, DataTransfer::files(vec![file]), 7);
    importer.run_until_idle(&mut host).await;

    let categories: Vec<_> = notifier.0.lock().unwrap().iter().map(|n| n.category).collect();
    assert_eq!(categories, vec![NotificationCategory::UploadSize]);
    assert_eq!(host.document().images().count(), 0);
    assert!(host.placeholders().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_pasted_url_is_fetched_then_uploaded() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _image = server
        .mock("GET", "/remote/chart.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png())
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/api/files")
        .with_status(200)
        .with_body("external-1.png")
        .create_async()
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut importer = importer(&server.url(), notifier.clone())?;
    let mut host = EditorHost::new(EditSession::new("notes", Document::from_paragraphs(["notes"])));

    let list = format!("{}/remote/chart.png", server.url());
    assert!(importer.handle_data_transfer(&mut host, DataTransfer::uri_list(&list), 7));
    importer.run_until_idle(&mut host).await;

    upload.assert_async().await;
    let images: Vec<_> = host.document().images().collect();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].alt, "Image insérée");
    assert_eq!(images[0].src, "https://cdn.test/external-1.png");
    Ok(())
}
