use clap::{Parser, Subcommand};
use library_admin::api::Resource;
use library_admin::auth::LoaderOutcome;
use library_admin::clients::ResourceClient;
use library_admin::config::AdminConfig;
use library_admin::lifecycle::{setup_tracing, DashboardSystem};
use library_admin::model::{Book, BorrowTransaction, Category, UserProfile};
use library_admin::AdminError;
use list_sync::{ListController, ListResource};
use tracing::{info, info_span, Instrument};

#[derive(Parser)]
#[command(name = "library-admin", version, about = "Library dashboard from the terminal")]
struct Cli {
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one page of a resource list.
    List {
        #[arg(value_enum)]
        resource: Resource,
        /// Query string as it would appear in the dashboard URL.
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Print a single item.
    Show {
        #[arg(value_enum)]
        resource: Resource,
        id: String,
    },
    /// Delete a book or a category.
    Delete {
        #[arg(value_enum)]
        resource: Resource,
        id: String,
    },
}

impl Command {
    fn resource(&self) -> Resource {
        match self {
            Command::List { resource, .. }
            | Command::Show { resource, .. }
            | Command::Delete { resource, .. } => *resource,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AdminError> {
    setup_tracing();
    let cli = Cli::parse();

    let mut config = AdminConfig::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    let system = DashboardSystem::new(config)?;

    let resource = cli.command.resource();
    let result = run(&system, cli.command)
        .instrument(info_span!("command", %resource))
        .await;

    system.shutdown().await?;
    result
}

async fn run(system: &DashboardSystem, command: Command) -> Result<(), AdminError> {
    let route = match &command {
        Command::List { resource, query } if !query.is_empty() => {
            format!("{}?{}", resource.route(), query.trim_start_matches('?'))
        }
        other => other.resource().route().to_string(),
    };
    if let LoaderOutcome::Redirect(to) = system.enter(&route).await? {
        return Err(AdminError::AccessDenied(to));
    }

    match command {
        Command::List { resource, .. } => match resource {
            Resource::Books => print_page(system.list_screen::<Book>()).await,
            Resource::Categories => print_page(system.list_screen::<Category>()).await,
            Resource::Transactions => {
                print_page(system.list_screen::<BorrowTransaction>()).await
            }
            Resource::Users => print_page(system.list_screen::<UserProfile>()).await,
        },
        Command::Show { resource, id } => {
            let clients = &system.clients;
            match resource {
                Resource::Books => print_item(clients.books.get(&id).await?),
                Resource::Categories => print_item(clients.categories.get(&id).await?),
                Resource::Transactions => print_item(clients.transactions.get(&id).await?),
                Resource::Users => print_item(clients.users.get(&id).await?),
            }
            Ok(())
        }
        Command::Delete { resource, id } => match resource {
            Resource::Books => Ok(system.clients.books.delete(&id).await?),
            Resource::Categories => Ok(system.clients.categories.delete(&id).await?),
            other => Err(AdminError::Unsupported(format!("{other} cannot be deleted"))),
        },
    }
}

async fn print_page<R: ListResource>(screen: ListController<R>) -> Result<(), AdminError> {
    let state = screen.wait_until_settled().await?;
    if let Some(error) = state.error() {
        return Err(error.clone().into());
    }
    let view = state.render();
    for row in view.rows {
        info!(id = row.id(), ?row);
    }
    info!(
        page = view.page,
        pages = view.page_count,
        "{}",
        view.summary()
    );
    Ok(())
}

fn print_item<T: std::fmt::Debug>(item: T) {
    info!(?item);
}
