mod ast;
mod lexer;
mod parser;

use std::fs;
use std::io::{self, Read};

use anyhow::Context;
use clap::{App, Arg};

use ast::ASTNode;
use parser::Parser;

fn main() -> anyhow::Result<()> {
    let matches = App::new("kaleidoscope-parse")
        .about("parses kaleidoscope source and dumps the AST of each top-level unit")
        .arg(
            Arg::with_name("INPUT")
                .help("source file to parse; reads stdin when omitted"),
        )
        .get_matches();

    let source = match matches.value_of("INPUT") {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let parser = Parser::default();
    for unit in parser.parse_str(&source) {
        match unit {
            Ok(node) => {
                match &node {
                    ASTNode::Extern(_) => println!("Parsed an extern."),
                    ASTNode::Function(func) if func.prototype.name.is_empty() => {
                        println!("Parsed a top-level expression.")
                    }
                    ASTNode::Function(_) => println!("Parsed a function definition."),
                }
                println!("{}", node);
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}
