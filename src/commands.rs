use std::time::Duration;

use ledgerstore::config::Config;
use ledgerstore::context::Context;
use ledgerstore::schema::DataStoreSchema;
use ledgerstore::storage::{DataStore, ReaderSource, new_data_store};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::cli::{Cli, Commands, GetArgs, KeyArgs, PutArgs, StoreCommand};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(cli: Cli, config: Config) -> Result<(), AnyError> {
    let timeout = cli
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.datastore.request_timeout());

    let command = match cli.command {
        Commands::Key(args) => return print_key(args, &config.schema),
        Commands::Store(command) => command,
    };

    let destination = config
        .datastore
        .destination_url
        .as_deref()
        .ok_or("datastore.destination_url is not configured")?;

    let ctx = Context::background().with_timeout(timeout);
    cancel_on_interrupt(&ctx);

    let store = new_data_store(&ctx, destination).await?;
    let result = execute(store.as_ref(), &ctx, command).await;
    store.close().await?;
    result
}

fn print_key(args: KeyArgs, schema: &DataStoreSchema) -> Result<(), AnyError> {
    let schema = DataStoreSchema {
        ledgers_per_file: args.ledgers_per_file.unwrap_or(schema.ledgers_per_file),
        files_per_partition: args
            .files_per_partition
            .unwrap_or(schema.files_per_partition),
        file_extension: args
            .extension
            .unwrap_or_else(|| schema.file_extension.clone()),
    };

    println!("{}", schema.object_key(args.sequence)?);
    Ok(())
}

async fn execute(
    store: &dyn DataStore,
    ctx: &Context,
    command: StoreCommand,
) -> Result<(), AnyError> {
    match command {
        StoreCommand::Exists(args) => {
            println!("{}", store.exists(ctx, &args.key).await?);
        }
        StoreCommand::Size(args) => {
            println!("{}", store.size(ctx, &args.key).await?);
        }
        StoreCommand::Get(args) => download(store, ctx, args).await?,
        StoreCommand::Put(args) => upload(store, ctx, args).await?,
    }
    Ok(())
}

async fn download(store: &dyn DataStore, ctx: &Context, args: GetArgs) -> Result<(), AnyError> {
    let mut reader = store.get(ctx, &args.key).await?;

    let copied = match args.output {
        Some(path) => {
            let mut file = tokio::fs::File::create(&path).await?;
            let copied = ctx.run(tokio::io::copy(&mut reader, &mut file)).await??;
            file.flush().await?;
            copied
        }
        None => {
            let mut stdout = tokio::io::stdout();
            let copied = ctx.run(tokio::io::copy(&mut reader, &mut stdout)).await??;
            stdout.flush().await?;
            copied
        }
    };

    info!(key = %args.key, size = copied, "Downloaded object");
    Ok(())
}

async fn upload(store: &dyn DataStore, ctx: &Context, args: PutArgs) -> Result<(), AnyError> {
    let file = tokio::fs::File::open(&args.input).await?;
    let mut source = ReaderSource::new(file);

    if args.if_not_exists {
        let written = store.put_if_not_exists(ctx, &args.key, &mut source).await?;
        println!("{}", written);
    } else {
        store.put(ctx, &args.key, &mut source).await?;
    }
    Ok(())
}

/// Cancel in-flight storage calls on Ctrl+C
fn cancel_on_interrupt(ctx: &Context) {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            ctx.cancel();
        }
    });
}
