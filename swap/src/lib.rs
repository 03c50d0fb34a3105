use std::{
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
    mem::size_of,
    sync::{Arc, Mutex},
};

use log::info;

use memory::Word;

#[derive(Debug, PartialEq)]
pub enum SwapError {
    IncorrectPageSize,
    OverCapacity,
}

const WORD_BYTES: usize = size_of::<Word>();
const HEADER_SIZE: usize = size_of::<u32>() * 2;

/// File-backed store with one page-sized slot per virtual page. A slot
/// that was never paged out reads back as all zeros.
#[derive(Debug, Clone)]
pub struct SwapFile {
    file: Arc<Mutex<File>>,
    page_size: usize,
    num_pages: usize,
}

pub fn make_name(name: &str) -> String {
    let name = name.replace("-", "_");
    let mut file_name = String::from("SWAP_FILE_");
    file_name.push_str(&name);
    file_name
}

fn write_header(file: &mut File, page_size: u32, num_pages: u32) -> Result<(), std::io::Error> {
    let page_size = page_size.to_be_bytes();
    file.seek(SeekFrom::Start(0))?;
    file.write(&page_size)?;
    let num_pages = num_pages.to_be_bytes();
    file.seek(SeekFrom::Start(size_of::<u32>() as u64))?;
    file.write(&num_pages)?;
    Ok(())
}

fn read_header(file: &mut File) -> Result<(u32, u32), std::io::Error> {
    let mut page_size: [u8; size_of::<u32>()] = [0; size_of::<u32>()];
    let mut num_pages = [0; size_of::<u32>()];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut page_size)?;
    let page_size = u32::from_be_bytes(page_size);

    file.seek(SeekFrom::Start(size_of::<u32>() as u64))?;
    file.read_exact(&mut num_pages)?;
    let num_pages = u32::from_be_bytes(num_pages);

    Ok((page_size, num_pages))
}

impl SwapFile {
    pub fn create(name: &str, page_size: usize, num_pages: usize) -> Result<Self, std::io::Error> {
        assert!(
            page_size.is_power_of_two(),
            "Page size {} is not a power of 2",
            page_size
        );
        let mut file = File::options()
            .truncate(true)
            .write(true)
            .read(true)
            .create(true)
            .open(make_name(name))?;
        file.set_len((HEADER_SIZE + num_pages * page_size * WORD_BYTES) as u64)?;
        write_header(&mut file, page_size as u32, num_pages as u32)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
            page_size,
            num_pages,
        })
    }

    pub fn connect(name: &str, page_size: usize, num_pages: usize) -> Result<Self, std::io::Error> {
        assert!(
            page_size.is_power_of_two(),
            "Page size {} is not a power of 2",
            page_size
        );
        let mut file = File::options().write(true).read(true).open(make_name(name))?;
        let (stored_page_size, stored_num_pages) = read_header(&mut file)?;
        assert_eq!(page_size, stored_page_size as usize, "Incorrect swap page size");
        assert_eq!(num_pages, stored_num_pages as usize, "Incorrect swap capacity");
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
            page_size,
            num_pages,
        })
    }

    pub fn read_page(&self, page_number: usize) -> Result<Vec<Word>, SwapError> {
        let mut file = self.file.lock().unwrap();
        info!("Start paging in page[{}]", page_number);
        if page_number >= self.num_pages {
            return Err(SwapError::OverCapacity);
        }
        file.seek(SeekFrom::Start(self.page_start(page_number))).unwrap();
        let mut buf = vec![0u8; self.page_size * WORD_BYTES];
        file.read_exact(&mut buf).unwrap();
        let mut words = Vec::with_capacity(self.page_size);
        for chunk in buf.chunks_exact(WORD_BYTES) {
            words.push(Word::from_be_bytes(chunk.try_into().unwrap()));
        }
        info!("Done paging in page[{}]", page_number);
        Ok(words)
    }

    pub fn write_page(&self, page_number: usize, page: &[Word]) -> Result<(), SwapError> {
        let mut file = self.file.lock().unwrap();
        info!("Start paging out page[{}]", page_number);
        if page.len() != self.page_size {
            return Err(SwapError::IncorrectPageSize);
        } else if page_number >= self.num_pages {
            return Err(SwapError::OverCapacity);
        }
        let mut buf = Vec::with_capacity(self.page_size * WORD_BYTES);
        for word in page {
            buf.extend_from_slice(&word.to_be_bytes());
        }
        file.seek(SeekFrom::Start(self.page_start(page_number))).unwrap();
        file.write(&buf).unwrap();
        info!("Done paging out page[{}]", page_number);
        Ok(())
    }

    fn page_start(&self, page_number: usize) -> u64 {
        HEADER_SIZE as u64 + (page_number * self.page_size * WORD_BYTES) as u64
    }
}
