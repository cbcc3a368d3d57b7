use clap::Parser;
use futures::executor::block_on;
use loader_kiln::{LastProgress, LoaderConfig, SceneLoader, SceneLoaderOptions};
use nab_kiln::app::{catch_panic, AppRun, ExitReason};
use scene_kiln::{Model, Scene, SceneSlot};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Parser)]
struct CliArgs
{
    #[arg(long)]
    config: Option<PathBuf>, // loader config (TOML)

    #[arg(long, help = "Scale each model so its longest axis is this long")]
    scale: Option<f32>,

    #[arg(long)]
    shadows: bool,

    #[arg(long)]
    always_active: bool,

    #[arg(long)]
    progress: bool,

    #[arg(long, help = "Pick the loader by this extension instead of the file's")]
    plugin_extension: Option<String>,

    #[arg(long, help = "Load everything again in a fresh scene")]
    reload: bool,

    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn print_mesh(model: &Model, index: usize, depth: usize)
{
    let mesh = &model.meshes[index];
    println!("{:indent$}- {} {:?}{}",
        "",
        mesh.name,
        mesh.transform.position,
        if mesh.receive_shadows { " (shadows)" } else { "" },
        indent = depth * 2);
    for child in model.children_of(index)
    {
        print_mesh(model, child, depth + 1);
    }
}

fn print_model(model: &Model)
{
    println!("{} [{}]", model.root.name, model.loader_name);
    println!("  scale: {:?}", model.root.transform.scale);
    match model.world_bounds()
    {
        Some(bounds) => println!("  bounds: {:?} .. {:?}", bounds.min, bounds.max),
        None => println!("  bounds: none"),
    }
    if !model.skeletons.is_empty() { println!("  skeletons: {:?}", model.skeletons); }
    if !model.animation_groups.is_empty() { println!("  animations: {:?}", model.animation_groups); }
    for root_child in model.root_children()
    {
        print_mesh(model, root_child, 1);
    }
}

// "a/b/robot.glb" -> ("a/b", "robot.glb")
fn split_path(path: &Path) -> Option<(&str, &str)>
{
    let file_name = path.file_name()?.to_str()?;
    let root_url = path.parent().map_or(Some(""), |p| p.to_str())?;
    Some((root_url, file_name))
}

fn run(args: &CliArgs) -> ExitReason
{

    let config = match &args.config
    {
        Some(path) => match LoaderConfig::from_file(path)
        {
            Ok(config) => config,
            Err(err) =>
            {
                log::error!("Failed to read {path:?}: {err}");
                return ExitReason::LoadFailures;
            }
        },
        None => LoaderConfig::default(),
    };

    let pool = match config.build_thread_pool()
    {
        Ok(pool) => pool,
        Err(err) =>
        {
            log::error!("Failed to start loader threads: {err}");
            return ExitReason::LoadFailures;
        }
    };

    let scene_slot = Arc::new(SceneSlot::new(Some(Arc::new(Scene::new("probe")))));
    let progress = Arc::new(LastProgress::default());
    let loader = SceneLoader::new(pool, Arc::new(config.gltf_fetcher()))
        .with_scene_provider(scene_slot.clone())
        .with_progress_sink(progress.clone());

    let options = SceneLoaderOptions
    {
        receive_shadows: args.shadows,
        scale_to_dimension: args.scale,
        always_select_as_active_mesh: args.always_active,
        report_progress: args.progress || config.report_progress,
        ..Default::default()
    }.on_model_loaded(|model| log::info!("Loaded {:?} ({} meshes) with {}", model.name, model.meshes.len(), model.loader_name));

    let passes = if args.reload { 2 } else { 1 };
    let mut failures = 0;
    for pass in 0..passes
    {
        if pass > 0
        {
            scene_slot.set(Some(Arc::new(Scene::new("probe-reload"))));
        }

        for file in &args.files
        {
            let Some((root_url, file_name)) = split_path(file) else
            {
                log::error!("{file:?} is not a loadable path");
                failures += 1;
                continue;
            };

            progress.clear();
            match block_on(loader.load(root_url, file_name, args.plugin_extension.as_deref(), &options))
            {
                Ok(model) =>
                {
                    print_model(&model);
                    if let Some(fraction) = progress.last().and_then(|p| p.fraction())
                    {
                        println!("  last progress: {:.0}%", fraction * 100.0);
                    }
                },
                Err(err) =>
                {
                    log::error!("Failed to load {file:?}: {err}");
                    failures += 1;
                },
            }
        }
        log::debug!("Pass {pass} cached {} model(s)", loader.cached_count());
    }

    match failures
    {
        0 => ExitReason::NormalExit,
        _ => ExitReason::LoadFailures,
    }
}

fn main() -> ExitReason
{
    let app_run = AppRun::<CliArgs>::startup("Kiln Probe", env!("CARGO_PKG_VERSION"));
    app_run.set_exit_reason(catch_panic(|| run(&app_run.args)));
    app_run.get_exit_reason()
}
