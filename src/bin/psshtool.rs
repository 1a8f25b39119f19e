use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wvpssh::{
    BoxEnvelope, FourCC, IsoFullBox, Pssh, PsshOptions, PsshSummary, WidevinePsshData, decode_payload,
    hex_to_bytes,
    util::hex_dump,
};

#[derive(Parser, Debug)]
#[command(version, about = "Inspect and build Widevine PSSH boxes")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a PSSH box and print what it carries
    Inspect(InspectArgs),
    /// Build a Widevine PSSH box from key IDs
    Create(CreateArgs),
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Base64 box, hex box with --hex, or @path to a raw binary file
    input: String,

    /// Treat INPUT as hex instead of base64
    #[arg(long, action = ArgAction::SetTrue)]
    hex: bool,

    /// Emit JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Hex-dump the raw data field
    #[arg(long, action = ArgAction::SetTrue)]
    dump: bool,

    /// Accept boxes from other DRM systems (payload is not decoded)
    #[arg(long, action = ArgAction::SetTrue)]
    any_system: bool,
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Key ID as hex; dashes and spaces allowed. Repeat for several keys.
    #[arg(long = "kid", required = true)]
    kids: Vec<String>,

    /// Content ID as hex
    #[arg(long)]
    content_id: Option<String>,

    #[arg(long)]
    provider: Option<String>,

    /// Protection scheme FourCC, e.g. cenc or cbcs
    #[arg(long)]
    protection_scheme: Option<String>,

    /// Box version (0 or 1)
    #[arg(long, default_value_t = 0)]
    version: u8,

    /// 24-bit box flags
    #[arg(long, default_value_t = 0)]
    flags: u32,

    /// Print hex instead of base64
    #[arg(long, action = ArgAction::SetTrue)]
    hex: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Inspect(args) => inspect(args),
        Command::Create(args) => create(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(args: &InspectArgs) -> anyhow::Result<Vec<u8>> {
    if let Some(path) = args.input.strip_prefix('@') {
        return std::fs::read(path).with_context(|| format!("failed to read {path}"));
    }
    if args.hex {
        return hex_to_bytes(&args.input).context("failed to decode hex input");
    }
    data_encoding::BASE64
        .decode(args.input.trim().as_bytes())
        .context("failed to decode base64 input")
}

fn inspect(args: InspectArgs) -> anyhow::Result<()> {
    let bytes = read_input(&args)?;
    info!(len = bytes.len(), "read pssh input");

    let summary = if args.any_system {
        let (header, env) =
            BoxEnvelope::parse_header_with(&IsoFullBox, &bytes).context("failed to parse PSSH box")?;
        let data = if env.ensure_widevine().is_ok() {
            Some(decode_payload(&env.payload).context("failed to decode PSSH data")?)
        } else {
            None
        };
        PsshSummary::new(&header, &env, data.as_ref())
    } else {
        let pssh = Pssh::parse(&bytes).context("failed to parse PSSH box")?;
        PsshSummary::from(&pssh)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_summary(&summary);

    if args.dump {
        let env = BoxEnvelope::parse_any(&bytes)?;
        println!();
        print!("{}", hex_dump(&env.payload, 0));
    }
    Ok(())
}

fn print_summary(s: &PsshSummary) {
    println!("Size:       {} bytes", s.size);
    println!("Version:    {}", s.version);
    println!("Flags:      {:#08x}", s.flags);
    println!("System ID:  {}{}", s.system_id, if s.widevine { " (widevine)" } else { "" });
    println!("Data Size:  {} bytes", s.data_size);

    if !s.header_key_ids.is_empty() {
        println!();
        println!("Header Key IDs ({}):", s.header_key_ids.len());
        for kid in &s.header_key_ids {
            println!("  {kid}");
        }
    }

    let Some(d) = &s.data else { return };
    if !d.key_ids.is_empty() {
        println!();
        println!("Key IDs ({}):", d.key_ids.len());
        for kid in &d.key_ids {
            println!("  {kid}");
        }
    }
    if let Some(cid) = &d.content_id {
        println!();
        match &d.content_id_text {
            Some(text) => println!("Content ID: {cid} ({text})"),
            None => println!("Content ID: {cid}"),
        }
    }
    for (label, value) in [
        ("Algorithm", &d.algorithm),
        ("Provider", &d.provider),
        ("Policy", &d.policy),
        ("Scheme", &d.protection_scheme),
        ("Type", &d.pssh_type),
    ] {
        if let Some(v) = value {
            println!("{:<11} {v}", format!("{label}:"));
        }
    }
}

fn create(args: CreateArgs) -> anyhow::Result<()> {
    let kids = args
        .kids
        .iter()
        .map(|k| hex_to_bytes(k).with_context(|| format!("bad key id {k:?}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut data = WidevinePsshData::from_key_ids(kids);
    if let Some(cid) = &args.content_id {
        data.content_id = Some(hex_to_bytes(cid).context("bad content id")?);
    }
    data.provider = args.provider;
    if let Some(scheme) = &args.protection_scheme {
        let Some(cc) = FourCC::from_str(scheme) else {
            bail!("protection scheme must be four characters, got {scheme:?}");
        };
        data.set_protection_scheme_fourcc(cc);
    }

    let opts = PsshOptions { version: args.version, flags: args.flags };
    let pssh = Pssh::new(data, opts).context("failed to build PSSH box")?;
    let bytes = pssh.to_bytes()?;
    info!(len = bytes.len(), key_ids = pssh.key_ids().len(), "built pssh box");

    if args.hex {
        println!("{}", hex::encode(bytes));
    } else {
        println!("{}", data_encoding::BASE64.encode(&bytes));
    }
    Ok(())
}
