use clap::{Args, Parser, Subcommand};
use docker_template::commands;
use docker_template::settings::{
    BuildOptions, DEFAULT_OUTPUT_FILE, DEFAULT_TEMPLATE_FILE, RenderOptions, Settings,
    split_additional_args,
};
use docker_template_build::{DEFAULT_PROGRAM, ProcessRunner};
use docker_template_core::{ConfigSection, ResolutionPolicy};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "docker-template", version)]
#[command(about = "テンプレートからDockerfileを生成し、イメージをビルドする", long_about = None)]
struct Cli {
    /// ビルド設定ファイル（省略時は build_configuration.{yaml,yml,json,kdl} を探索）
    #[arg(
        short = 'b',
        long = "build-config-file",
        env = "DOCKER_TEMPLATE_CONFIG",
        global = true
    )]
    build_config_file: Option<PathBuf>,
    /// 詳細なログを出力
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 利用可能なタグの一覧を表示
    ListTags,
    /// テンプレートを展開
    Render {
        #[command(flatten)]
        render: RenderArgs,
    },
    /// テンプレートを展開してイメージをビルド
    Build {
        #[command(flatten)]
        render: RenderArgs,
        #[command(flatten)]
        build: BuildArgs,
        /// ターゲットプラットフォーム（指定するとbuildxでビルドしてプッシュ）
        #[arg(short = 'p', long)]
        platform: Option<String>,
    },
    /// buildx でマルチプラットフォームビルド（レジストリへのプッシュを伴う）
    Buildx {
        #[command(flatten)]
        render: RenderArgs,
        #[command(flatten)]
        build: BuildArgs,
        /// ターゲットプラットフォーム（例: linux/amd64,linux/arm64）
        #[arg(short = 'p', long)]
        platform: String,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// 設定ファイルから選ぶタグ（name:tag 形式、例: myapp:3.9.1）
    tag: String,
    /// 使用するDockerfileテンプレート
    #[arg(short = 'f', long = "template-file", default_value = DEFAULT_TEMPLATE_FILE)]
    template_file: PathBuf,
    /// 出力先ファイル
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
    /// タグ文字列全体をコンテキストのキーとして使う（name:tag に分割しない）
    #[arg(long)]
    whole_tag: bool,
}

impl RenderArgs {
    fn into_options(self) -> RenderOptions {
        RenderOptions {
            tag: self.tag,
            template_file: self.template_file,
            output: self.output,
            policy: if self.whole_tag {
                ResolutionPolicy::WholeStringKey
            } else {
                ResolutionPolicy::SplitOnFirstColon
            },
        }
    }
}

#[derive(Args)]
struct BuildArgs {
    /// イメージ名の前に付けるレジストリ（例: registry.example.com）
    #[arg(short = 'r', long, env = "DOCKER_TEMPLATE_REGISTRY")]
    registry: Option<String>,
    /// 短縮タグ（3.9.1 → 3.9）と latest も付ける
    #[arg(short = 'l', long)]
    latest: bool,
    /// イメージ名とタグを name:tag 形式で明示（繰り返し指定可）
    #[arg(short = 't', long = "tag", value_name = "NAME:TAG")]
    tags: Vec<String>,
    /// テンプレートを展開せず、ビルドコマンドを表示するだけ
    #[arg(long)]
    dry: bool,
    /// ビルドツールにそのまま渡す追加引数（繰り返し指定可）
    #[arg(short = 'a', long = "additional-args", allow_hyphen_values = true)]
    additional_args: Vec<String>,
    /// ビルドツール（docker, podman など）
    #[arg(long, env = "DOCKER_TEMPLATE_BUILDER", default_value = DEFAULT_PROGRAM)]
    builder: String,
}

impl BuildArgs {
    fn into_options(self, platform: Option<String>) -> BuildOptions {
        BuildOptions {
            registry: self.registry,
            platform,
            include_latest: self.latest,
            explicit_tags: self.tags,
            additional_args: split_additional_args(&self.additional_args),
            dry: self.dry,
            builder: self.builder,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    docker_template::logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => docker_template::report_error(&e),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::from_current_dir(ConfigSection::Builds)?
        .with_config_file(cli.build_config_file);

    match cli.command {
        Commands::ListTags => commands::list_tags::handle(&settings),
        Commands::Render { render } => commands::render::handle(&settings, &render.into_options()),
        Commands::Build {
            render,
            build,
            platform,
        } => commands::build::handle(
            &settings,
            &render.into_options(),
            &build.into_options(platform),
            &ProcessRunner::with_working_dir(&settings.working_dir),
        ),
        Commands::Buildx {
            render,
            build,
            platform,
        } => commands::build::handle(
            &settings,
            &render.into_options(),
            &build.into_options(Some(platform)),
            &ProcessRunner::with_working_dir(&settings.working_dir),
        ),
    }
}
