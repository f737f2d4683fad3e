//! Rendering of the generated artifacts.
//!
//! Everything here is a pure function from validated [`SyscallRecord`]s to
//! text, in table order: the caller decides which artifacts to write and
//! where. Two artifacts exist:
//!
//! - the definitions header: `__NR_<name>` defines plus C prototypes, the
//!   prototypes fenced off behind `#ifndef ASSEMBLY` so the same header can
//!   be included from assembly;
//! - the stubs file: one trampoline per syscall that loads `__NR_<name>`
//!   into r12 and issues `swi #0`.

use std::fmt::Write;
use std::path::Path;

use crate::table::SyscallRecord;

/// License block at the top of every generated file.
pub const LICENSE_HEADER: &str = "\
/*
 * Copyright (c) The stubgen authors. All rights reserved
 *
 * Permission is hereby granted, free of charge, to any person obtaining
 * a copy of this software and associated documentation files
 * (the \"Software\"), to deal in the Software without restriction,
 * including without limitation the rights to use, copy, modify, merge,
 * publish, distribute, sublicense, and/or sell copies of the Software,
 * and to permit persons to whom the Software is furnished to do so,
 * subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be
 * included in all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND,
 * EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
 * MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
 * IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
 * CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
 * TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE
 * SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 */
";

pub const AUTOGEN_BANNER: &str = "\n/* This file is auto-generated. !!! DO NOT EDIT !!! */\n\n";

/// Header providing the `FUNCTION()` assembler macro.
pub const ASM_HEADER: &str = "asm.h";

const ASM_IFDEF: &str = "\n#ifndef ASSEMBLY\n";
const ASM_ENDIF: &str = "\n#endif";

/// `#define __NR_<name> <number>`, the numeric literal exactly as written
/// in the table.
pub fn render_define(rec: &SyscallRecord) -> String {
    format!("#define __NR_{}\t\t{}\n", rec.name, rec.number_lit)
}

/// One-line C forward declaration.
pub fn render_prototype(rec: &SyscallRecord) -> String {
    format!("{} {} ({});\n", rec.return_type, rec.name, rec.c_args())
}

/// Trampoline block: own text section, `FUNCTION()` entry, number load,
/// supervisor call, return.
pub fn render_stub(rec: &SyscallRecord) -> String {
    format!(
        "\n\
         .section .text.{name}\n\
         FUNCTION({name})\n    \
         ldr     r12, =__NR_{name}\n    \
         swi     #0\n    \
         bx      lr\n",
        name = rec.name
    )
}

/// The definitions/prototypes header, assembled in table order.
pub fn render_std_header(records: &[SyscallRecord]) -> String {
    let mut out = String::new();
    out.push_str(LICENSE_HEADER);
    out.push_str(AUTOGEN_BANNER);
    for rec in records {
        out.push_str(&render_define(rec));
    }
    out.push_str(ASM_IFDEF);
    out.push('\n');
    for rec in records {
        out.push_str(&render_prototype(rec));
    }
    out.push_str(ASM_ENDIF);
    out
}

/// The assembly stubs file, assembled in table order.
///
/// `std_header` is the path the definitions header was written to in the
/// same run, if any; the include list must only name files that actually
/// got generated.
pub fn render_stubs_file(records: &[SyscallRecord], std_header: Option<&Path>) -> String {
    let mut out = String::new();
    out.push_str(LICENSE_HEADER);
    out.push_str(AUTOGEN_BANNER);
    let _ = writeln!(out, "#include <{}>", ASM_HEADER);
    if let Some(path) = std_header {
        let _ = writeln!(out, "#include <{}>", path.display());
    }
    for rec in records {
        out.push_str(&render_stub(rec));
    }
    out
}
