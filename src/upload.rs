// Copyright 2018 The GeoRust Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::Error;

/// An uploaded file: a seekable byte stream plus the content type the client declared.
#[derive(Debug)]
pub struct Upload<R> {
    reader: R,
    content_type: String,
}

impl Upload<Cursor<Vec<u8>>> {
    /// Wrap an in-memory upload.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Upload::new(Cursor::new(bytes.into()), content_type)
    }
}

impl<R: Read + Seek> Upload<R> {
    pub fn new(reader: R, content_type: impl Into<String>) -> Self {
        Upload {
            reader,
            content_type: content_type.into(),
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Read the whole stream from its start, leaving it rewound afterwards.
    pub fn read_contents(&mut self) -> Result<Vec<u8>, Error> {
        self.reader.seek(SeekFrom::Start(0)).map_err(Error::Upload)?;
        let mut contents = Vec::new();
        let read = self.reader.read_to_end(&mut contents);
        let rewind = self.reader.seek(SeekFrom::Start(0));
        read.map_err(Error::Upload)?;
        rewind.map_err(Error::Upload)?;
        Ok(contents)
    }

    /// Current position of the underlying stream.
    pub fn position(&mut self) -> Result<u64, Error> {
        self.reader.stream_position().map_err(Error::Upload)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
