extern crate feedback_driver as feedback;

use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use feedback::post::PostSort;
use feedback::{App, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let app = App::new(&config)?;

    if let Some(credentials) = &config.credentials {
        let user = app.login(&credentials.email, &credentials.password).await?;
        info!(user = user.name.as_str(), "signed in");
    }

    app.orgs().fetch_orgs().await?;
    let org = match app.orgs().current() {
        Some(org) => org,
        None => {
            info!("no organizations");
            return Ok(());
        }
    };
    info!(org = org.slug.as_str(), role = org.role.as_str(), "organization");

    app.boards().fetch_boards(&org.id).await?;
    let boards = app.boards().boards();
    for board in &boards {
        info!(board = board.slug.as_str(), posts = board.post_count, "board");
    }

    if let Some(board) = boards.first() {
        app.posts()
            .fetch_posts(&board.id, Some(PostSort::Votes), None)
            .await?;
        for post in app.posts().posts() {
            info!(
                votes = post.vote_count,
                comments = post.comment_count,
                status = %post.status,
                "{}",
                post.title
            );
        }
    }

    Ok(())
}
