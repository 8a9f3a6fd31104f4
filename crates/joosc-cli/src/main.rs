// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Typhon Project
// SPDX-FileName: crates/joosc-cli/src/main.rs
// SPDX-FileType: SOURCE
// SPDX-License-Identifier: Apache-2.0
// -------------------------------------------------------------------------
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
// -------------------------------------------------------------------------
//! Compiler core driver
//!
//! Registers every compilation pass, enables the ones requested on the
//! command line, runs them, and renders whatever diagnostics they raised.

mod cli;
mod error;
mod passes;

use anyhow::{Context, Result};
use clap::Parser;
use joosc_pass::PassManager;

use cli::Args;
use error::DriverError;
use passes::{
    AstBuilderPass, AstPrinterPass, CodegenPass, ExpressionResolutionPass, HierarchyCheckPass, NameResolutionPass,
    TirPrinterPass,
};

/// One entry in the pass table: a human name/description pair plus the
/// closure that registers the concrete pass, so `--list-passes` and the
/// real run share one source of truth.
struct PassEntry {
    name: &'static str,
    description: &'static str,
    register: fn(&mut PassManager, bool),
}

fn pass_table() -> Vec<PassEntry> {
    vec![
        PassEntry {
            name: "ast-builder",
            description: "constructs the worked-example compilation units this core ships with",
            register: |pm, enabled| { let _ = pm.add_pass(AstBuilderPass::new(), enabled); },
        },
        PassEntry {
            name: "name-resolution",
            description: "resolves top-level type names and reference types",
            register: |pm, enabled| { let _ = pm.add_pass(NameResolutionPass::new(), enabled); },
        },
        PassEntry {
            name: "expression-resolution",
            description: "resolves local, field, and method names inside method bodies",
            register: |pm, enabled| { let _ = pm.add_pass(ExpressionResolutionPass::new(), enabled); },
        },
        PassEntry {
            name: "hierarchy-check",
            description: "checks inheritance cycles, overrides, and abstract coverage",
            register: |pm, enabled| { let _ = pm.add_pass(HierarchyCheckPass::new(), enabled); },
        },
        PassEntry {
            name: "codegen",
            description: "lowers the checked AST to a linked TIR compilation unit",
            register: |pm, enabled| { let _ = pm.add_pass(CodegenPass::new(), enabled); },
        },
        PassEntry {
            name: "ast-printer",
            description: "prints a plain-text dump of the resolved AST",
            register: |pm, enabled| { let _ = pm.add_pass(AstPrinterPass::new(), enabled); },
        },
        PassEntry {
            name: "tir-printer",
            description: "prints a plain-text dump of the generated TIR",
            register: |pm, enabled| { let _ = pm.add_pass(TirPrinterPass::new(), enabled); },
        },
    ]
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let table = pass_table();
    if args.list_passes {
        for entry in &table {
            println!("{:<22} {}", entry.name, entry.description);
        }
        return Ok(());
    }

    let requested: Vec<&str> = args.passes.iter().map(String::as_str).collect();
    for name in &requested {
        if !table.iter().any(|entry| &entry.name == name) {
            return Err(DriverError::UnknownPass((*name).to_string()).into());
        }
    }

    let mut manager = PassManager::new();
    manager.diag().set_verbose(args.verbose);

    for entry in &table {
        let printer_enabled = match entry.name {
            "ast-printer" => args.print_ast,
            "tir-printer" => args.emit_tir,
            _ => false,
        };
        let enabled = requested.contains(&entry.name) || printer_enabled;
        (entry.register)(&mut manager, enabled);
    }

    manager.run().map_err(DriverError::from).context("pass run failed")?;

    let diag = manager.diag();
    let had_errors = diag.has_errors();
    for diagnostic in diag.diagnostics() {
        eprintln!("{diagnostic}");
    }

    if had_errors {
        std::process::exit(1);
    }
    Ok(())
}
