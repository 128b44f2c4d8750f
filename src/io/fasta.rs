use anyhow::{anyhow, Context, Result};
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

/// 逐条读取 FASTA 记录（多行序列、CRLF、行内空白均可）
pub struct FastaReader<R: BufRead> {
    reader: R,
    line: String,
    pending: Option<String>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pending: None,
            done: false,
        }
    }

    fn read_line(&mut self) -> Result<bool> {
        self.line.clear();
        Ok(self.reader.read_line(&mut self.line)? > 0)
    }

    fn next_header(&mut self) -> Result<Option<String>> {
        if let Some(h) = self.pending.take() {
            return Ok(Some(h));
        }
        while self.read_line()? {
            if let Some(rest) = self.line.strip_prefix('>') {
                return Ok(Some(rest.trim().to_string()));
            }
        }
        Ok(None)
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }
        let Some(header) = self.next_header()? else {
            self.done = true;
            return Ok(None);
        };

        let (id, desc) = match header.split_once(char::is_whitespace) {
            Some((id, rest)) => {
                let rest = rest.trim();
                (id.to_string(), (!rest.is_empty()).then(|| rest.to_string()))
            }
            None => (header, None),
        };

        let mut seq = Vec::new();
        loop {
            if !self.read_line()? {
                self.done = true;
                break;
            }
            if let Some(rest) = self.line.strip_prefix('>') {
                self.pending = Some(rest.trim().to_string());
                break;
            }
            seq.extend(
                self.line
                    .bytes()
                    .filter(|b| !b.is_ascii_whitespace())
                    .map(|b| b.to_ascii_uppercase()),
            );
        }

        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

/// 读取文件中的第一条记录；文件为空时报错
pub fn read_first_record(path: impl AsRef<Path>) -> Result<FastaRecord> {
    let path = path.as_ref();
    let fh = std::fs::File::open(path)
        .with_context(|| format!("cannot open FASTA '{}'", path.display()))?;
    let mut reader = FastaReader::new(std::io::BufReader::new(fh));
    reader
        .next_record()?
        .ok_or_else(|| anyhow!("FASTA file '{}' contains no sequences", path.display()))
}
