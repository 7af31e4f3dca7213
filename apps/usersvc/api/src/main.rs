//! Users Service - Entry Point

#[tokio::main]
async fn main() -> eyre::Result<()> {
    usersvc_api::run().await
}
