#[tokio::main]
async fn main() -> std::io::Result<()> {
    project_tracker::run().await
}
