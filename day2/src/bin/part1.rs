use day2::get_num_safe;

use std::env;

use anyhow::Result;
use util::{input_path, read_input_file};

fn main() -> Result<()> {
    let input = read_input_file(input_path(env::args()))?;

    let res = get_num_safe(&input)?;

    println!("{res}");

    Ok(())
}
