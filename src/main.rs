use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};

use occlude::config::OccludeConfig;
use occlude::domain::{ImageOcclusion, Point, StudyMode, validate_tapes};
use occlude::error::ValidationError;
use occlude::render::{self, PixmapSurface, TapeStyle};
use occlude::session::{
    AuthoringEngine, AuthoringMsg, StudyMsg, StudySession, handle_authoring_msg,
    handle_study_msg,
};
use occlude::source::{self, SourceSlot};
use occlude::store::{DirImageStorage, ImageLocation, ImageStorage, JsonFileStore, OcclusionStore};

#[derive(Parser, Debug)]
#[command(name = "occlude", version)]
struct Cli {
    /// Data directory (defaults to the configured one).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List occlusions, optionally for one deck.
    List {
        #[arg(long)]
        deck: Option<u64>,
    },
    /// Print one occlusion as JSON.
    Show { id: u64 },
    /// Store an image and create an occlusion over it.
    Create(CreateArgs),
    /// Delete an occlusion.
    Delete { id: u64 },
    /// Render a study frame as a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct CreateArgs {
    /// Deck the occlusion belongs to.
    #[arg(long)]
    deck: u64,

    /// Image file to occlude.
    #[arg(long)]
    image: PathBuf,

    /// Tape as `x,y,w,h[,label[,answer]]` in image pixels; repeatable.
    #[arg(long = "rect", required = true)]
    rects: Vec<RectArg>,

    #[arg(long)]
    title: Option<String>,

    /// Study mode: `all` or `one`.
    #[arg(long, default_value_t = StudyMode::All)]
    mode: StudyMode,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    id: u64,

    /// Output PNG path.
    out: PathBuf,

    /// Reveal every tape (ALL mode).
    #[arg(long, conflicts_with = "step")]
    reveal_all: bool,

    /// Step to show, 1-based (ONE mode).
    #[arg(long)]
    step: Option<usize>,

    /// Reveal the tape at the current step.
    #[arg(long, requires = "step")]
    answer: bool,
}

/// Tape given on the command line
#[derive(Clone, Debug, PartialEq)]
struct RectArg {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    label: Option<String>,
    answer: Option<String>,
}

impl FromStr for RectArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(6, ',');
        let mut number = |name: &str| -> Result<f32, String> {
            parts
                .next()
                .ok_or_else(|| format!("missing {name} in '{s}'"))?
                .trim()
                .parse()
                .map_err(|e| format!("invalid {name} in '{s}': {e}"))
        };
        let (x, y, width, height) = (number("x")?, number("y")?, number("width")?, number("height")?);
        let label = parts.next().map(str::to_string);
        let answer = parts.next().map(str::to_string);
        Ok(Self {
            x,
            y,
            width,
            height,
            label,
            answer,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = OccludeConfig::load();
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir());
    let store = JsonFileStore::open(data_dir.join("occlusions.json"))
        .context("Failed to open occlusion store")?;
    let images = DirImageStorage::new(&data_dir);

    match cli.cmd {
        Command::List { deck } => cmd_list(&store, deck).await,
        Command::Show { id } => cmd_show(&store, id).await,
        Command::Create(args) => cmd_create(&store, &images, &config, args).await,
        Command::Delete { id } => cmd_delete(&store, id).await,
        Command::Render(args) => cmd_render(&store, &images, &config, args).await,
    }
}

async fn find(store: &JsonFileStore, id: u64) -> anyhow::Result<ImageOcclusion> {
    store
        .get_by_id(id)
        .await?
        .with_context(|| format!("occlusion {id} not found"))
}

async fn cmd_list(store: &JsonFileStore, deck: Option<u64>) -> anyhow::Result<()> {
    let occlusions = match deck {
        Some(deck) => store.list_by_deck(deck).await?,
        None => store.list_all().await?,
    };
    for o in occlusions {
        println!(
            "{:>5}  deck {:<5} {:<4} {:>3} tapes  {}",
            o.id,
            o.deck_id,
            o.mode.as_str(),
            o.occlusions.len(),
            o.display_title()
        );
    }
    Ok(())
}

async fn cmd_show(store: &JsonFileStore, id: u64) -> anyhow::Result<()> {
    let occlusion = find(store, id).await?;
    println!("{}", serde_json::to_string_pretty(&occlusion)?);
    Ok(())
}

async fn cmd_create(
    store: &JsonFileStore,
    images: &DirImageStorage,
    config: &OccludeConfig,
    args: CreateArgs,
) -> anyhow::Result<()> {
    let file_name = args
        .image
        .file_name()
        .and_then(|n| n.to_str())
        .context("image path has no file name")?;
    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("Failed to read image: {}", args.image.display()))?;
    let (width, height) = source::decode_bytes(&bytes)?.dimensions();

    let mut engine = AuthoringEngine::new(args.deck, config.min_tape_size);
    engine.set_image_size(width, height);
    for (i, rect) in args.rects.iter().enumerate() {
        if rect.x + rect.width > width as f32 || rect.y + rect.height > height as f32 {
            log::warn!(
                "Tape {} extends past the {}x{} image and will be clipped",
                i + 1,
                width,
                height
            );
        }
        engine.pointer_down(Point::new(rect.x, rect.y));
        let committed =
            engine.pointer_up(Point::new(rect.x + rect.width, rect.y + rect.height));
        if committed.is_none() {
            bail!(
                "tape {} is {}x{} inside the image, tapes must be larger than {}px on both sides",
                i + 1,
                rect.width,
                rect.height,
                config.min_tape_size
            );
        }
        if let Some(label) = &rect.label {
            handle_authoring_msg(&mut engine, AuthoringMsg::SetLabel(label.clone()));
        }
        if let Some(answer) = &rect.answer {
            handle_authoring_msg(&mut engine, AuthoringMsg::SetAnswer(answer.clone()));
        }
    }
    if let Some(title) = args.title {
        handle_authoring_msg(&mut engine, AuthoringMsg::SetTitle(title));
    }
    handle_authoring_msg(&mut engine, AuthoringMsg::SetMode(args.mode));

    // Reject bad input before the image is copied into storage
    if args.deck == 0 {
        return Err(ValidationError::InvalidDeck.into());
    }
    validate_tapes(engine.rects().all())?;

    let image_path = images.store(file_name, &bytes)?;
    handle_authoring_msg(&mut engine, AuthoringMsg::BindImage(image_path));
    let saved = engine.save(store).await?;
    println!("{}", saved.id);
    Ok(())
}

async fn cmd_delete(store: &JsonFileStore, id: u64) -> anyhow::Result<()> {
    let removed = store
        .delete(id)
        .await?
        .with_context(|| format!("occlusion {id} not found"))?;
    println!("Deleted {} ({})", removed.id, removed.display_title());
    Ok(())
}

async fn cmd_render(
    store: &JsonFileStore,
    images: &DirImageStorage,
    config: &OccludeConfig,
    args: RenderArgs,
) -> anyhow::Result<()> {
    let occlusion = find(store, args.id).await?;
    let path = local_image(images, &occlusion.image_path)?;

    let mut slot = SourceSlot::new();
    let ticket = slot.request(occlusion.image_path.clone());
    slot.resolve(ticket, source::decode_file(&path).await);
    if let Some(message) = slot.error() {
        bail!("cannot render occlusion {}: {}", occlusion.id, message);
    }
    let base = slot
        .ready()
        .context("base image did not finish loading")?;

    let mut session = StudySession::new(&occlusion);
    if args.reveal_all {
        if occlusion.mode != StudyMode::All {
            bail!("--reveal-all needs an occlusion in 'all' mode");
        }
        for rect in occlusion.occlusions.iter() {
            let center = rect.bounds().center();
            handle_study_msg(&mut session, StudyMsg::ClickAt(center.x, center.y));
        }
    }
    if let Some(step) = args.step {
        if occlusion.mode != StudyMode::One {
            bail!("--step needs an occlusion in 'one' mode");
        }
        for _ in 1..step {
            handle_study_msg(&mut session, StudyMsg::Next);
        }
        if args.answer {
            handle_study_msg(&mut session, StudyMsg::Reveal);
        }
    }

    let style = TapeStyle::from(config);
    let mut surface = PixmapSurface::for_image(&base.rgba).context("base image has no pixels")?;
    render::render_study(&mut surface, &base.rgba, &session, &style);
    surface
        .into_rgba_image()
        .save(&args.out)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    println!("{}", session.progress_text());
    if let Some(answer) = session.disclosed_answer() {
        println!("Answer: {answer}");
    }
    Ok(())
}

fn local_image(images: &DirImageStorage, image_path: &str) -> anyhow::Result<PathBuf> {
    match images.resolve(image_path) {
        ImageLocation::Local(path) => Ok(path),
        ImageLocation::Remote(url) => bail!("remote image {url} must be downloaded first"),
    }
}
