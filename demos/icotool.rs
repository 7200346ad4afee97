use clap::{App, Arg, ArgMatches, SubCommand};
use icoedit::{
    ColorDepth, DepthDecision, EncodeOptions, IconDir, IconImage, Palette16,
};
use std::fmt::Display;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

//===========================================================================//

fn main() {
    env_logger::init();
    let palette_arg = Arg::with_name("palette")
        .takes_value(true)
        .value_name("PATH")
        .short("p")
        .long("palette")
        .help("Loads the 16-color palette from a text file");
    let output_arg = Arg::with_name("output")
        .takes_value(true)
        .value_name("PATH")
        .short("o")
        .long("output")
        .help("Sets output path");
    let allow_empty_arg = Arg::with_name("allow-empty")
        .long("allow-empty")
        .help("Writes fully transparent icons too");
    let hidden_text_arg = Arg::with_name("hidden-text")
        .takes_value(true)
        .value_name("TEXT")
        .long("hidden-text")
        .help("Appends text after the icon data");
    let mismatch_arg = Arg::with_name("mismatch")
        .takes_value(true)
        .value_name("ACTION")
        .long("mismatch")
        .possible_values(&["ask", "accept", "decline", "abort"])
        .default_value("ask")
        .help("What to do when an icon's colors suggest another depth");
    let matches = App::new("icotool")
        .version("0.1")
        .about("Manipulates ICO files with fixed-palette color depths")
        .subcommand(
            SubCommand::with_name("create")
                .about("Creates an ICO file from PNG files")
                .arg(palette_arg.clone())
                .arg(output_arg.clone())
                .arg(allow_empty_arg.clone())
                .arg(hidden_text_arg.clone())
                .arg(mismatch_arg.clone())
                .arg(Arg::with_name("image").multiple(true)),
        )
        .subcommand(
            SubCommand::with_name("extract")
                .about("Extracts an icon from an ICO file as a PNG")
                .arg(palette_arg.clone())
                .arg(output_arg.clone())
                .arg(Arg::with_name("ico").required(true))
                .arg(Arg::with_name("index").required(true)),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Lists icons in an ICO file")
                .arg(palette_arg.clone())
                .arg(Arg::with_name("ico").required(true)),
        )
        .subcommand(
            SubCommand::with_name("recode")
                .about("Decodes an ICO file and encodes it again")
                .arg(palette_arg)
                .arg(output_arg)
                .arg(allow_empty_arg)
                .arg(hidden_text_arg)
                .arg(mismatch_arg)
                .arg(Arg::with_name("ico").required(true)),
        )
        .get_matches();
    if let Some(submatches) = matches.subcommand_matches("create") {
        let palette = load_palette(submatches);
        let mut images = Vec::new();
        if let Some(paths) = submatches.values_of("image") {
            for path in paths {
                println!("Adding {:?}", path);
                let file = fs::File::open(path).unwrap_or_else(|e| fail(e));
                let image = IconImage::read_png(file, &palette)
                    .unwrap_or_else(|e| fail(e));
                images.push(image);
            }
        }
        let out_path = output_path(submatches, "out.ico");
        save(submatches, IconDir::new(images), &palette, out_path);
    } else if let Some(submatches) = matches.subcommand_matches("extract") {
        let palette = load_palette(submatches);
        let path = submatches.value_of("ico").unwrap_or_default();
        let icondir = open(path, &palette);
        let index = submatches.value_of("index").unwrap_or_default();
        let index = index.parse::<usize>().unwrap_or_else(|e| fail(e));
        let image = match icondir.images().get(index) {
            Some(image) => image,
            None => fail(format!(
                "{} has only {} icon(s)",
                path,
                icondir.images().len()
            )),
        };
        let out_path = if let Some(path) = submatches.value_of("output") {
            PathBuf::from(path)
        } else {
            PathBuf::from(format!("{}.{}.png", path, index))
        };
        let out_file =
            fs::File::create(out_path).unwrap_or_else(|e| fail(e));
        image.write_png(out_file).unwrap_or_else(|e| fail(e));
    } else if let Some(submatches) = matches.subcommand_matches("list") {
        let palette = load_palette(submatches);
        let path = submatches.value_of("ico").unwrap_or_default();
        let icondir = open(path, &palette);
        println!("Resource type: {:?}", icondir.resource_type());
        for (index, image) in icondir.images().iter().enumerate() {
            let suffix = if image.is_empty() { ", empty" } else { "" };
            println!(
                "{:5}: {}x{} {} bpp{}",
                index,
                image.size(),
                image.size(),
                image.color_depth().bits_per_pixel(),
                suffix
            );
        }
        if !icondir.trailer().is_empty() {
            println!(
                "Hidden text: {:?}",
                String::from_utf8_lossy(icondir.trailer())
            );
        }
    } else if let Some(submatches) = matches.subcommand_matches("recode") {
        let palette = load_palette(submatches);
        let path = submatches.value_of("ico").unwrap_or_default();
        let icondir = open(path, &palette);
        let out_path = output_path(submatches, "recoded.ico");
        save(submatches, icondir, &palette, out_path);
    }
}

//===========================================================================//

fn fail<E: Display, T>(error: E) -> T {
    eprintln!("icotool: {}", error);
    process::exit(1);
}

fn load_palette(matches: &ArgMatches) -> Palette16 {
    match matches.value_of("palette") {
        Some(path) => Palette16::load_or_default(path),
        None => Palette16::default(),
    }
}

fn open(path: &str, palette: &Palette16) -> IconDir {
    let file = fs::File::open(path).unwrap_or_else(|e| fail(e));
    IconDir::read(file, palette).unwrap_or_else(|e| fail(e))
}

fn output_path(matches: &ArgMatches, default_name: &str) -> PathBuf {
    if let Some(path) = matches.value_of("output") {
        return PathBuf::from(path);
    }
    let mut path = PathBuf::from(default_name);
    let mut index: i32 = 0;
    while path.exists() {
        index += 1;
        path = PathBuf::from(format!("{}{}", index, default_name));
    }
    path
}

fn save(
    matches: &ArgMatches,
    mut icondir: IconDir,
    palette: &Palette16,
    out_path: PathBuf,
) {
    let options = EncodeOptions {
        include_empty: matches.is_present("allow-empty"),
        trailer_text: matches
            .value_of("hidden-text")
            .unwrap_or_default()
            .to_string(),
    };
    let mismatch = matches.value_of("mismatch").unwrap_or("ask");
    let resolver = |index: usize, image: &IconImage, suggested: ColorDepth| {
        match mismatch {
            "accept" => DepthDecision::Accept,
            "decline" => DepthDecision::Decline,
            "abort" => DepthDecision::Abort,
            _ => ask(index, image, suggested),
        }
    };
    let mut data = Vec::<u8>::new();
    icondir
        .write(&mut data, palette, &options, resolver)
        .unwrap_or_else(|e| fail(e));
    fs::write(&out_path, data).unwrap_or_else(|e| fail(e));
    println!("Wrote {:?}", out_path);
}

fn ask(
    index: usize,
    image: &IconImage,
    suggested: ColorDepth,
) -> DepthDecision {
    let size = image.size();
    eprint!(
        "Icon #{} ({}x{}) is set to {} bpp, but its colors suggest {} bpp.\n\
         Switch to {} bpp? [y]es / [n]o / [c]ancel: ",
        index,
        size,
        size,
        image.color_depth().bits_per_pixel(),
        suggested.bits_per_pixel(),
        suggested.bits_per_pixel()
    );
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return DepthDecision::Abort;
    }
    match answer.trim().chars().next() {
        Some('y') | Some('Y') => DepthDecision::Accept,
        Some('n') | Some('N') => DepthDecision::Decline,
        _ => DepthDecision::Abort,
    }
}

//===========================================================================//
