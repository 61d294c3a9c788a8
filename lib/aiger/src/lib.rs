//! Pure-Rust data model, reader, writer and incremental constructor for the
//! AIGER (And-Inverter Graph) file format.
//!
//! This crate plays the role of an external "AIG library": it knows nothing
//! about model checking, shared signals or proof obligations. It only knows
//! how to hold an and-inverter graph in memory, read and write it in the
//! ASCII (`aag`) and binary (`aig`) formats, and build one incrementally with
//! literal-level simplification.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, BufRead, Read, Write};

/// The constant false literal.
pub const FALSE: u32 = 0;
/// The constant true literal.
pub const TRUE: u32 = 1;

/// Returns the polarity bit of a literal (0 = positive, 1 = negated).
pub const fn sign(lit: u32) -> u32 {
    lit & 1
}
/// Strips the polarity bit, returning the uncomplemented literal.
pub const fn strip(lit: u32) -> u32 {
    lit & !1
}
/// Inverts a literal, toggling its polarity.
pub const fn not(lit: u32) -> u32 {
    lit ^ 1
}
/// Returns the uncomplemented literal for a variable index.
pub const fn var2lit(var: u32) -> u32 {
    var << 1
}
/// Returns the variable index of a literal.
pub const fn lit2var(lit: u32) -> u32 {
    lit >> 1
}

/// A named signal: an output, bad state, constraint or fairness literal.
#[derive(Debug, Clone)]
pub struct Signal {
    /// The literal of the signal.
    pub lit: u32,
    /// An optional name from the symbol table.
    pub name: Option<String>,
}

/// An input of the circuit.
#[derive(Debug, Clone)]
pub struct Input {
    /// The (uncomplemented) literal of the input.
    pub lit: u32,
    /// An optional name from the symbol table.
    pub name: Option<String>,
}

/// A latch of the circuit, with its next-state function and reset value.
#[derive(Debug, Clone)]
pub struct Latch {
    /// The (uncomplemented) literal of the latch.
    pub lit: u32,
    /// The next-state literal.
    pub next: u32,
    /// The reset value: a constant, or equal to `lit` if uninitialized.
    pub reset: u32,
    /// An optional name from the symbol table.
    pub name: Option<String>,
}

/// An and-gate of the circuit: `lhs = rhs0 & rhs1`.
#[derive(Debug, Clone, Copy)]
pub struct And {
    /// The (uncomplemented) literal defined by the gate.
    pub lhs: u32,
    /// The first conjunct.
    pub rhs0: u32,
    /// The second conjunct.
    pub rhs1: u32,
}

/// A justice property: the conjunction of these literals must hold
/// infinitely often under fairness.
#[derive(Debug, Clone)]
pub struct Justice {
    /// The literals of the justice property.
    pub lits: Vec<u32>,
    /// An optional name from the symbol table.
    pub name: Option<String>,
}

/// An and-inverter graph, as parsed from or to be written to an AIGER file.
#[derive(Debug, Clone, Default)]
pub struct Aig {
    /// The maximum variable index currently used.
    pub max_var: u32,
    /// The inputs, in file order.
    pub inputs: Vec<Input>,
    /// The latches, in file order.
    pub latches: Vec<Latch>,
    /// The and-gates, in file (topological) order.
    pub ands: Vec<And>,
    /// The plain outputs.
    pub outputs: Vec<Signal>,
    /// The bad-state properties.
    pub bad: Vec<Signal>,
    /// The invariant constraints.
    pub constraints: Vec<Signal>,
    /// The justice properties.
    pub justice: Vec<Justice>,
    /// The fairness constraints.
    pub fairness: Vec<Signal>,
    /// Free-form comments, in file order.
    pub comments: Vec<String>,
}

/// The mode used for reading or writing an [`Aig`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AigerMode {
    /// The human-readable ASCII format (`.aag`).
    Ascii,
    /// The compressed binary format (`.aig`).
    Binary,
}

/// An error encountered while parsing an AIGER file.
#[derive(Debug)]
pub struct AigerParseError {
    /// A human-readable description of the problem.
    pub message: String,
}

impl fmt::Display for AigerParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AigerParseError {}

fn parse_err<T>(message: impl Into<String>) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        AigerParseError {
            message: message.into(),
        },
    ))
}

impl Aig {
    /// Returns whether `lit` refers to one of the inputs.
    pub fn is_input(&self, lit: u32) -> bool {
        self.inputs.iter().any(|i| i.lit == strip(lit))
    }
    /// Returns whether `lit` refers to one of the latches.
    pub fn is_latch(&self, lit: u32) -> bool {
        self.latches.iter().any(|l| l.lit == strip(lit))
    }
    /// Returns whether `lit` refers to one of the and-gates.
    pub fn is_and(&self, lit: u32) -> bool {
        self.ands.iter().any(|a| a.lhs == strip(lit))
    }
    /// Returns the latch with the given literal, if any.
    pub fn latch(&self, lit: u32) -> Option<&Latch> {
        self.latches.iter().find(|l| l.lit == strip(lit))
    }
    /// Returns the and-gate with the given literal, if any.
    pub fn and_gate(&self, lit: u32) -> Option<&And> {
        self.ands.iter().find(|a| a.lhs == strip(lit))
    }

    /// Returns whether the inputs and latches are *reencoded*: input
    /// literals occupy `2, 4, ..., 2*num_inputs` and latch literals
    /// immediately follow.
    pub fn reencoded(&self) -> bool {
        let mut v = 0u32;
        for i in &self.inputs {
            v += 1;
            if i.lit != 2 * v {
                return false;
            }
        }
        for l in &self.latches {
            v += 1;
            if l.lit != 2 * v {
                return false;
            }
        }
        true
    }

    /// Reads an [`Aig`] in either ASCII or binary format, detected from the
    /// magic header (`aag` or `aig`).
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails, or if the input is not a
    /// well-formed AIGER file.
    pub fn read<R: Read>(reader: R) -> io::Result<Self> {
        let mut reader = io::BufReader::new(reader);
        let mut magic = [0u8; 3];
        reader.read_exact(&mut magic)?;
        match &magic {
            b"aag" => AsciiReader::new(reader).read(),
            b"aig" => BinaryReader::new(reader).read(),
            _ => parse_err(format!(
                "unknown magic '{}', expected 'aag' or 'aig'",
                String::from_utf8_lossy(&magic)
            )),
        }
    }

    /// Writes this circuit in the given mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write<W: Write>(&self, writer: W, mode: AigerMode) -> io::Result<()> {
        match mode {
            AigerMode::Ascii => AsciiWriter::new(writer).write(self),
            AigerMode::Binary => BinaryWriter::new(writer).write(self),
        }
    }

    /// Returns the symbol attached to `lit`, if any, searching inputs and
    /// latches (the only signals a shared-mapping annotation can attach to).
    pub fn symbol(&self, lit: u32) -> Option<&str> {
        let v = strip(lit);
        self.inputs
            .iter()
            .find(|i| i.lit == v)
            .and_then(|i| i.name.as_deref())
            .or_else(|| {
                self.latches
                    .iter()
                    .find(|l| l.lit == v)
                    .and_then(|l| l.name.as_deref())
            })
    }
}

struct HeaderCounts {
    max_var: u32,
    num_inputs: u32,
    num_latches: u32,
    num_outputs: u32,
    num_ands: u32,
    num_bad: u32,
    num_constraints: u32,
    num_justice: u32,
    num_fairness: u32,
}

fn parse_header_line(line: &str, kind: &str) -> io::Result<HeaderCounts> {
    let mut it = line.split_ascii_whitespace();
    let tag = it.next();
    if tag != Some(kind) {
        return parse_err(format!("expected '{}' header, found '{}'", kind, line));
    }
    let mut nums = [0u32; 9];
    let mut count = 0;
    for (i, n) in it.enumerate() {
        if i >= 9 {
            break;
        }
        nums[i] = n
            .parse()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "invalid header number"))?;
        count = i + 1;
    }
    if count < 5 {
        return parse_err("header requires at least M I L O A");
    }
    Ok(HeaderCounts {
        max_var: nums[0],
        num_inputs: nums[1],
        num_latches: nums[2],
        num_outputs: nums[3],
        num_ands: nums[4],
        num_bad: nums[5],
        num_constraints: nums[6],
        num_justice: nums[7],
        num_fairness: nums[8],
    })
}

/// Reads the trailing symbol table and comment section shared by both
/// formats, and attaches names to the already-populated circuit.
fn read_symbols_and_comments<R: BufRead>(reader: &mut R, aig: &mut Aig) -> io::Result<()> {
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            return Ok(());
        }
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "c" {
            let mut rest = String::new();
            reader.read_to_string(&mut rest)?;
            for c in rest.split('\n') {
                aig.comments.push(c.to_string());
            }
            if aig.comments.last().is_some_and(String::is_empty) {
                aig.comments.pop();
            }
            return Ok(());
        }
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let tag = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default().trim().to_string();
        if tag.is_empty() {
            continue;
        }
        let (kind, idx) = tag.split_at(1);
        let idx: usize = match idx.parse() {
            Ok(i) => i,
            Err(_) => continue,
        };
        match kind {
            "i" => {
                if let Some(i) = aig.inputs.get_mut(idx) {
                    i.name = Some(name);
                }
            }
            "l" => {
                if let Some(l) = aig.latches.get_mut(idx) {
                    l.name = Some(name);
                }
            }
            "o" => {
                if let Some(o) = aig.outputs.get_mut(idx) {
                    o.name = Some(name);
                }
            }
            "b" => {
                if let Some(b) = aig.bad.get_mut(idx) {
                    b.name = Some(name);
                }
            }
            "c" => {
                if let Some(c) = aig.constraints.get_mut(idx) {
                    c.name = Some(name);
                }
            }
            "j" => {
                if let Some(j) = aig.justice.get_mut(idx) {
                    j.name = Some(name);
                }
            }
            "f" => {
                if let Some(f) = aig.fairness.get_mut(idx) {
                    f.name = Some(name);
                }
            }
            _ => {}
        }
    }
}

struct AsciiReader<R> {
    reader: io::BufReader<R>,
}

impl<R: Read> AsciiReader<R> {
    fn new(reader: io::BufReader<R>) -> Self {
        Self { reader }
    }

    fn read(mut self) -> io::Result<Aig> {
        let mut header_line = String::from("aag");
        header_line.push_str(&self.read_line()?);
        let h = parse_header_line(&header_line, "aag")?;

        let mut aig = Aig {
            max_var: h.max_var,
            ..Aig::default()
        };

        for _ in 0..h.num_inputs {
            let lit: u32 = self.read_num_line()?;
            aig.inputs.push(Input { lit, name: None });
        }
        for _ in 0..h.num_latches {
            let line = self.read_line()?;
            let mut it = line.split_ascii_whitespace();
            let lit = parse_tok(it.next(), "latch literal")?;
            let next = parse_tok(it.next(), "latch next")?;
            let reset = match it.next() {
                Some(tok) => tok
                    .parse()
                    .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "latch reset"))?,
                None => 0,
            };
            aig.latches.push(Latch {
                lit,
                next,
                reset,
                name: None,
            });
        }
        for _ in 0..h.num_outputs {
            let lit = self.read_num_line()?;
            aig.outputs.push(Signal { lit, name: None });
        }
        for _ in 0..h.num_bad {
            let lit = self.read_num_line()?;
            aig.bad.push(Signal { lit, name: None });
        }
        for _ in 0..h.num_constraints {
            let lit = self.read_num_line()?;
            aig.constraints.push(Signal { lit, name: None });
        }
        for _ in 0..h.num_justice {
            let count: usize = self.read_num_line()?.try_into().unwrap_or(0);
            let mut lits = Vec::with_capacity(count);
            for _ in 0..count {
                lits.push(self.read_num_line()?);
            }
            aig.justice.push(Justice { lits, name: None });
        }
        for _ in 0..h.num_fairness {
            let lit = self.read_num_line()?;
            aig.fairness.push(Signal { lit, name: None });
        }
        for _ in 0..h.num_ands {
            let line = self.read_line()?;
            let mut it = line.split_ascii_whitespace();
            let lhs = parse_tok(it.next(), "and lhs")?;
            let rhs0 = parse_tok(it.next(), "and rhs0")?;
            let rhs1 = parse_tok(it.next(), "and rhs1")?;
            aig.ands.push(And { lhs, rhs0, rhs1 });
        }

        read_symbols_and_comments(&mut self.reader, &mut aig)?;
        Ok(aig)
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return parse_err("unexpected end of file");
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn read_num_line(&mut self) -> io::Result<u32> {
        let line = self.read_line()?;
        line.trim()
            .parse()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "expected a literal"))
    }
}

fn parse_tok(tok: Option<&str>, what: &str) -> io::Result<u32> {
    tok.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, format!("missing {}", what)))?
        .parse()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, format!("invalid {}", what)))
}

struct BinaryReader<R> {
    reader: io::BufReader<R>,
}

impl<R: Read> BinaryReader<R> {
    fn new(reader: io::BufReader<R>) -> Self {
        Self { reader }
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut b = [0u8; 1];
        self.reader.read_exact(&mut b)?;
        Ok(b[0])
    }

    fn read_delta(&mut self) -> io::Result<u32> {
        let mut x: u32 = 0;
        let mut shift = 0;
        loop {
            let byte = self.read_byte()?;
            x |= u32::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Ok(x)
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return parse_err("unexpected end of file");
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn read(mut self) -> io::Result<Aig> {
        let mut header_line = String::from("aig");
        header_line.push_str(&self.read_line()?);
        let h = parse_header_line(&header_line, "aig")?;

        let mut aig = Aig {
            max_var: h.max_var,
            ..Aig::default()
        };

        for i in 0..h.num_inputs {
            aig.inputs.push(Input {
                lit: var2lit(i + 1),
                name: None,
            });
        }
        for i in 0..h.num_latches {
            let line = self.read_line()?;
            let mut it = line.split_ascii_whitespace();
            let next = parse_tok(it.next(), "latch next")?;
            let reset = match it.next() {
                Some(tok) => tok
                    .parse()
                    .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "latch reset"))?,
                None => 0,
            };
            aig.latches.push(Latch {
                lit: var2lit(h.num_inputs + i + 1),
                next,
                reset,
                name: None,
            });
        }
        for _ in 0..h.num_outputs {
            let lit = parse_tok(Some(self.read_line()?.trim()), "output literal")?;
            aig.outputs.push(Signal { lit, name: None });
        }
        for _ in 0..h.num_bad {
            let lit = parse_tok(Some(self.read_line()?.trim()), "bad literal")?;
            aig.bad.push(Signal { lit, name: None });
        }
        for _ in 0..h.num_constraints {
            let lit = parse_tok(Some(self.read_line()?.trim()), "constraint literal")?;
            aig.constraints.push(Signal { lit, name: None });
        }
        for _ in 0..h.num_justice {
            let count: usize = self
                .read_line()?
                .trim()
                .parse()
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "expected justice size"))?;
            let mut lits = Vec::with_capacity(count);
            for _ in 0..count {
                lits.push(parse_tok(Some(self.read_line()?.trim()), "justice literal")?);
            }
            aig.justice.push(Justice { lits, name: None });
        }
        for _ in 0..h.num_fairness {
            let lit = parse_tok(Some(self.read_line()?.trim()), "fairness literal")?;
            aig.fairness.push(Signal { lit, name: None });
        }
        let first_and_lhs = var2lit(h.num_inputs + h.num_latches + 1);
        for i in 0..h.num_ands {
            let lhs = first_and_lhs + 2 * i;
            let d0 = self.read_delta()?;
            let d1 = self.read_delta()?;
            let rhs0 = lhs
                .checked_sub(d0)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "and delta underflow"))?;
            let rhs1 = rhs0
                .checked_sub(d1)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "and delta underflow"))?;
            aig.ands.push(And { lhs, rhs0, rhs1 });
        }

        read_symbols_and_comments(&mut self.reader, &mut aig)?;
        Ok(aig)
    }
}

struct AsciiWriter<W> {
    writer: W,
}

impl<W: Write> AsciiWriter<W> {
    fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write(mut self, aig: &Aig) -> io::Result<()> {
        writeln!(
            self.writer,
            "aag {} {} {} {} {} {} {} {} {}",
            aig.max_var,
            aig.inputs.len(),
            aig.latches.len(),
            aig.outputs.len(),
            aig.ands.len(),
            aig.bad.len(),
            aig.constraints.len(),
            aig.justice.len(),
            aig.fairness.len(),
        )?;
        for i in &aig.inputs {
            writeln!(self.writer, "{}", i.lit)?;
        }
        for l in &aig.latches {
            if l.reset == 0 {
                writeln!(self.writer, "{} {}", l.lit, l.next)?;
            } else {
                writeln!(self.writer, "{} {} {}", l.lit, l.next, l.reset)?;
            }
        }
        for o in &aig.outputs {
            writeln!(self.writer, "{}", o.lit)?;
        }
        for b in &aig.bad {
            writeln!(self.writer, "{}", b.lit)?;
        }
        for c in &aig.constraints {
            writeln!(self.writer, "{}", c.lit)?;
        }
        for j in &aig.justice {
            writeln!(self.writer, "{}", j.lits.len())?;
            for lit in &j.lits {
                writeln!(self.writer, "{}", lit)?;
            }
        }
        for f in &aig.fairness {
            writeln!(self.writer, "{}", f.lit)?;
        }
        for a in &aig.ands {
            writeln!(self.writer, "{} {} {}", a.lhs, a.rhs0, a.rhs1)?;
        }
        write_symbols_and_comments(&mut self.writer, aig)
    }
}

struct BinaryWriter<W> {
    writer: W,
}

impl<W: Write> BinaryWriter<W> {
    fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_delta(&mut self, mut x: u32) -> io::Result<()> {
        loop {
            let byte = (x & 0x7f) as u8;
            x >>= 7;
            if x != 0 {
                self.writer.write_all(&[byte | 0x80])?;
            } else {
                self.writer.write_all(&[byte])?;
                break;
            }
        }
        Ok(())
    }

    fn write(mut self, aig: &Aig) -> io::Result<()> {
        writeln!(
            self.writer,
            "aig {} {} {} {} {} {} {} {} {}",
            aig.max_var,
            aig.inputs.len(),
            aig.latches.len(),
            aig.outputs.len(),
            aig.ands.len(),
            aig.bad.len(),
            aig.constraints.len(),
            aig.justice.len(),
            aig.fairness.len(),
        )?;
        for l in &aig.latches {
            if l.reset == 0 {
                writeln!(self.writer, "{}", l.next)?;
            } else {
                writeln!(self.writer, "{} {}", l.next, l.reset)?;
            }
        }
        for o in &aig.outputs {
            writeln!(self.writer, "{}", o.lit)?;
        }
        for b in &aig.bad {
            writeln!(self.writer, "{}", b.lit)?;
        }
        for c in &aig.constraints {
            writeln!(self.writer, "{}", c.lit)?;
        }
        for j in &aig.justice {
            writeln!(self.writer, "{}", j.lits.len())?;
            for lit in &j.lits {
                writeln!(self.writer, "{}", lit)?;
            }
        }
        for f in &aig.fairness {
            writeln!(self.writer, "{}", f.lit)?;
        }
        for a in &aig.ands {
            let (rhs0, rhs1) = if a.rhs0 >= a.rhs1 {
                (a.rhs0, a.rhs1)
            } else {
                (a.rhs1, a.rhs0)
            };
            self.write_delta(a.lhs - rhs0)?;
            self.write_delta(rhs0 - rhs1)?;
        }
        write_symbols_and_comments(&mut self.writer, aig)
    }
}

fn write_symbols_and_comments<W: Write>(writer: &mut W, aig: &Aig) -> io::Result<()> {
    for (i, s) in aig.inputs.iter().enumerate() {
        if let Some(n) = &s.name {
            writeln!(writer, "i{} {}", i, n)?;
        }
    }
    for (i, s) in aig.latches.iter().enumerate() {
        if let Some(n) = &s.name {
            writeln!(writer, "l{} {}", i, n)?;
        }
    }
    for (i, s) in aig.outputs.iter().enumerate() {
        if let Some(n) = &s.name {
            writeln!(writer, "o{} {}", i, n)?;
        }
    }
    for (i, s) in aig.bad.iter().enumerate() {
        if let Some(n) = &s.name {
            writeln!(writer, "b{} {}", i, n)?;
        }
    }
    for (i, s) in aig.constraints.iter().enumerate() {
        if let Some(n) = &s.name {
            writeln!(writer, "c{} {}", i, n)?;
        }
    }
    for (i, s) in aig.justice.iter().enumerate() {
        if let Some(n) = &s.name {
            writeln!(writer, "j{} {}", i, n)?;
        }
    }
    for (i, s) in aig.fairness.iter().enumerate() {
        if let Some(n) = &s.name {
            writeln!(writer, "f{} {}", i, n)?;
        }
    }
    if !aig.comments.is_empty() {
        writeln!(writer, "c")?;
        for c in &aig.comments {
            writeln!(writer, "{}", c)?;
        }
    }
    Ok(())
}

impl fmt::Display for Aig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = Vec::new();
        self.write(&mut bytes, AigerMode::Ascii)
            .map_err(|_| fmt::Error)?;
        write!(f, "{}", String::from_utf8_lossy(&bytes))
    }
}

/// A literal in a circuit under incremental construction by [`AigBuilder`].
///
/// Wraps a raw `u32` literal so that [`Literal::TRUE`]/[`Literal::FALSE`]
/// and negation are checked by the type system instead of by convention.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Literal(pub u32);

impl Literal {
    /// The constant false literal.
    pub const FALSE: Self = Self(FALSE);
    /// The constant true literal.
    pub const TRUE: Self = Self(TRUE);

    /// Returns the constant literal with the given boolean value.
    pub fn from_bool(val: bool) -> Self {
        if val {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    /// Returns the raw literal value.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl std::ops::Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(not(self.0))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
struct LiteralPair {
    lit0: Literal,
    lit1: Literal,
}

/// The construction phase of an [`AigBuilder`]: inputs must all be added
/// before any and-gate, mirroring the AIGER invariant that input literals
/// precede and-gate literals.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Phase {
    Io,
    And,
}

/// An incremental, write-only constructor for a purely combinational
/// (latch-free) AIGER circuit.
///
/// Hashes the operands of existing and-gates and applies constant-folding /
/// idempotence simplifications, so that the resulting circuit may be
/// smaller than a direct, unsimplified construction of the same function.
pub struct AigBuilder {
    inputs: Vec<Input>,
    ands: Vec<And>,
    outputs: Vec<Signal>,
    cur_var: u32,
    phase: Phase,
    and_cache: HashMap<LiteralPair, Literal>,
}

impl Default for AigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AigBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            ands: Vec::new(),
            outputs: Vec::new(),
            cur_var: 0,
            phase: Phase::Io,
            and_cache: HashMap::new(),
        }
    }

    /// Adds a fresh input, optionally with a name (used to carry the
    /// quantifier-level annotation "0"/"1"/"2").
    ///
    /// # Panics
    ///
    /// Panics if an and-gate has already been added: all inputs of a check
    /// circuit must be allocated before any and-gate, so that literal
    /// numbering keeps inputs and and-gates in disjoint ranges.
    pub fn add_input(&mut self, name: Option<&str>) -> Literal {
        assert_eq!(self.phase, Phase::Io, "input added after and-gate");
        self.cur_var += 1;
        let lit = Literal(var2lit(self.cur_var));
        self.inputs.push(Input {
            lit: lit.0,
            name: name.map(str::to_string),
        });
        lit
    }

    /// Adds an and-gate with the given operands, applying constant folding,
    /// idempotence and an and-gate cache. Returns the resulting literal,
    /// which may be an existing literal rather than a freshly allocated one.
    pub fn add_and(&mut self, lhs: Literal, rhs: Literal) -> Literal {
        self.phase = Phase::And;
        if lhs == rhs {
            lhs
        } else if lhs == !rhs || lhs == Literal::FALSE || rhs == Literal::FALSE {
            Literal::FALSE
        } else if lhs == Literal::TRUE {
            rhs
        } else if rhs == Literal::TRUE {
            lhs
        } else {
            let (lo, hi) = (std::cmp::min(lhs, rhs), std::cmp::max(lhs, rhs));
            let pair = LiteralPair { lit0: lo, lit1: hi };
            match self.and_cache.entry(pair) {
                Entry::Occupied(e) => *e.get(),
                Entry::Vacant(e) => {
                    self.cur_var += 1;
                    let lit = Literal(var2lit(self.cur_var));
                    self.ands.push(And {
                        lhs: lit.0,
                        rhs0: lo.0,
                        rhs1: hi.0,
                    });
                    *e.insert(lit)
                }
            }
        }
    }

    /// Adds an or-gate, forwarding to [`add_and`](Self::add_and) via De
    /// Morgan's law, with the same simplifications and cache.
    pub fn add_or(&mut self, lhs: Literal, rhs: Literal) -> Literal {
        !self.add_and(!lhs, !rhs)
    }

    /// Adds an implication `lhs -> rhs`.
    pub fn add_implies(&mut self, lhs: Literal, rhs: Literal) -> Literal {
        self.add_or(!lhs, rhs)
    }

    /// Adds gates for an if-then-else construct, with the applicable
    /// simplifications falling back to a direct construction otherwise.
    pub fn add_ite(&mut self, lit: Literal, then_lit: Literal, else_lit: Literal) -> Literal {
        if lit == Literal::TRUE || then_lit == else_lit {
            then_lit
        } else if lit == Literal::FALSE {
            else_lit
        } else if then_lit == Literal::TRUE || lit == then_lit {
            self.add_or(lit, else_lit)
        } else if then_lit == Literal::FALSE || !lit == then_lit {
            self.add_and(!lit, else_lit)
        } else if else_lit == Literal::TRUE || !lit == else_lit {
            self.add_or(!lit, then_lit)
        } else if else_lit == Literal::FALSE || lit == else_lit {
            self.add_and(lit, then_lit)
        } else {
            let then_or = self.add_or(!lit, then_lit);
            let else_or = self.add_or(lit, else_lit);
            self.add_and(then_or, else_or)
        }
    }

    /// Adds the balanced conjunction of `lits` using a pairwise tournament
    /// reduction, so that the resulting circuit depth is logarithmic in the
    /// number of literals rather than linear. Returns [`Literal::TRUE`] for
    /// an empty input.
    pub fn conj_balanced<I: IntoIterator<Item = Literal>>(&mut self, lits: I) -> Literal {
        let mut level: Vec<Literal> = lits.into_iter().collect();
        if level.is_empty() {
            return Literal::TRUE;
        }
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut it = level.into_iter();
            while let Some(a) = it.next() {
                next.push(match it.next() {
                    Some(b) => self.add_and(a, b),
                    None => a,
                });
            }
            level = next;
        }
        level[0]
    }

    /// Adds an output with the given name and literal.
    pub fn add_output(&mut self, name: &str, lit: Literal) {
        self.outputs.push(Signal {
            lit: lit.0,
            name: Some(name.to_string()),
        });
    }

    /// Returns the number of and-gates constructed so far.
    pub fn num_ands(&self) -> usize {
        self.ands.len()
    }

    /// Consumes the builder, returning the constructed (latch-free) [`Aig`].
    pub fn into_aig(self) -> Aig {
        Aig {
            max_var: self.cur_var,
            inputs: self.inputs,
            latches: Vec::new(),
            ands: self.ands,
            outputs: self.outputs,
            bad: Vec::new(),
            constraints: Vec::new(),
            justice: Vec::new(),
            fairness: Vec::new(),
            comments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_simplifications() {
        let mut b = AigBuilder::new();
        let x = b.add_input(Some("x"));
        let y = b.add_input(Some("y"));
        let z = b.add_input(Some("z"));

        assert_ne!(Literal::TRUE, Literal::FALSE);
        assert_eq!(x, !!x);
        assert_eq!(!Literal::TRUE, Literal::FALSE);

        assert_eq!(b.add_and(x, x), x);
        assert_eq!(b.add_or(x, x), x);
        assert_eq!(b.add_and(x, !x), Literal::FALSE);
        assert_eq!(b.add_and(x, Literal::TRUE), x);
        assert_eq!(b.add_and(x, Literal::FALSE), Literal::FALSE);
        assert_eq!(b.add_or(x, Literal::FALSE), x);
        assert_eq!(b.add_or(x, Literal::TRUE), Literal::TRUE);

        let yz = b.add_and(y, z);
        assert_eq!(b.add_and(z, y), yz, "and cache is commutative");

        assert_eq!(b.add_ite(Literal::TRUE, y, z), y);
        assert_eq!(b.add_ite(Literal::FALSE, y, z), z);
        assert_eq!(b.add_ite(x, y, y), y);
    }

    #[test]
    fn test_conj_balanced_empty_is_true() {
        let mut b = AigBuilder::new();
        assert_eq!(b.conj_balanced(Vec::new()), Literal::TRUE);
    }

    #[test]
    fn test_conj_balanced_matches_linear_gate_count() {
        let mut b = AigBuilder::new();
        let lits: Vec<_> = (0..5)
            .map(|i| b.add_input(Some(&format!("x{i}"))))
            .collect();
        let mut linear = lits[0];
        for &l in &lits[1..] {
            linear = b.add_and(linear, l);
        }
        let mut b2 = AigBuilder::new();
        let lits2: Vec<_> = (0..5)
            .map(|i| b2.add_input(Some(&format!("x{i}"))))
            .collect();
        let balanced = b2.conj_balanced(lits2);
        assert_eq!(b.num_ands(), 4);
        assert_eq!(b2.num_ands(), 4);
        let _ = (linear, balanced);
    }

    #[test]
    #[should_panic(expected = "input added after and-gate")]
    fn test_input_after_and_panics() {
        let mut b = AigBuilder::new();
        let x = b.add_input(Some("x"));
        let y = b.add_input(Some("y"));
        b.add_and(x, y);
        b.add_input(Some("z"));
    }

    #[test]
    fn test_ascii_round_trip() {
        let mut b = AigBuilder::new();
        let x = b.add_input(Some("x"));
        let y = b.add_input(Some("y"));
        let g = b.add_and(x, y);
        b.add_output("out", g);
        let aig = b.into_aig();

        let mut bytes = Vec::new();
        aig.write(&mut bytes, AigerMode::Ascii).unwrap();
        let parsed = Aig::read(&bytes[..]).unwrap();
        assert_eq!(parsed.inputs.len(), 2);
        assert_eq!(parsed.ands.len(), 1);
        assert_eq!(parsed.outputs.len(), 1);
        assert_eq!(parsed.outputs[0].lit, g.0);
        assert_eq!(parsed.inputs[0].name.as_deref(), Some("x"));
    }

    #[test]
    fn test_binary_round_trip() {
        let mut b = AigBuilder::new();
        let x = b.add_input(None);
        let y = b.add_input(None);
        let z = b.add_input(None);
        let g1 = b.add_and(x, y);
        let g2 = b.add_and(g1, z);
        b.add_output("out", g2);
        let aig = b.into_aig();

        let mut bytes = Vec::new();
        aig.write(&mut bytes, AigerMode::Binary).unwrap();
        let parsed = Aig::read(&bytes[..]).unwrap();
        assert_eq!(parsed.ands.len(), 2);
        assert_eq!(parsed.ands[0].lhs, g1.0);
        assert_eq!(parsed.ands[1].lhs, g2.0);
        assert_eq!(parsed.ands[0].rhs0, x.0.max(y.0));
        assert_eq!(parsed.outputs[0].lit, g2.0);
    }

    #[test]
    fn test_reencoded() {
        let mut b = AigBuilder::new();
        b.add_input(None);
        b.add_input(None);
        let aig = b.into_aig();
        assert!(aig.reencoded());
    }

    #[test]
    fn test_latch_and_mapping_comment_round_trip() {
        let src = "aag 4 1 1 0 2\n2\n4 6\n6 2 4\n8 4 5\nc\nMAPPING 1\n2 2\n";
        let aig = Aig::read(src.as_bytes()).unwrap();
        assert_eq!(aig.latches.len(), 1);
        assert_eq!(aig.latches[0].lit, 4);
        assert_eq!(aig.latches[0].next, 6);
        assert_eq!(aig.latches[0].reset, 0);
        assert_eq!(
            aig.comments,
            vec!["MAPPING 1".to_string(), "2 2".to_string()]
        );
    }
}
