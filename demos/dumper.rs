//! Dump every project visible to a token, with its open issues.
//!
//! Run with:
//! ```
//! GITLAB_URL=https://gitlab.example.com GITLAB_TOKEN=your-token cargo run --example dumper
//! ```
//!
//! Set `OTHER_TOKEN` to also print the user behind a second token.

use std::sync::Arc;

use glapi::{
    current_user, GitlabClient, Issue, IssueListQuery, List, Project, ProjectListQuery,
    TracingLogger,
};

#[tokio::main]
async fn main() -> glapi::Result<()> {
    // RUST_LOG=info shows one line per request
    tracing_subscriber::fmt::init();

    let client = GitlabClient::from_env()?.with_logger(Arc::new(TracingLogger));
    println!("Connected to: {}{}", client.host_url(), client.api_path());

    let me = current_user(&client).await?;
    println!("Token belongs to: {} ({})", me.username, me.name);

    let projects = Project::list_all(&client, &ProjectListQuery::default()).await?;
    println!("\n--- {} projects ---", projects.len());

    for project in &projects {
        println!("{} [{}]", project.path_with_namespace, project.id);

        let query = IssueListQuery {
            state: Some("opened".to_string()),
            ..IssueListQuery::for_project(project.project_ref())
        };
        match Issue::list_all(&client, &query).await {
            Ok(issues) => {
                for issue in issues.iter().take(5) {
                    println!("  #{} {}", issue.iid, issue.title);
                }
                if issues.len() > 5 {
                    println!("  ... and {} more", issues.len() - 5);
                }
            }
            // Issues may be disabled for the project
            Err(err) if err.status_code() == Some(403) => {}
            Err(err) => return Err(err),
        }
    }

    if let Ok(other) = std::env::var("OTHER_TOKEN") {
        let child = client.child().with_token(other);
        let them = current_user(&child).await?;
        println!("\nOTHER_TOKEN belongs to: {}", them.username);
    }

    Ok(())
}
