use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

pub mod read {
    use divan::Bencher;
    use std::io::{prelude::*, Cursor};
    use ja2_slf::SlfArchive;

    // 512 entries of 4 KiB each, laid out like a tileset library
    fn get_input() -> Vec<u8> {
        let count = 512u32;
        let mut out = vec![0u8; 532];
        out[512..516].copy_from_slice(&count.to_le_bytes());
        out[516..520].copy_from_slice(&count.to_le_bytes());

        let data_start = out.len() as u32;
        out.extend((0..count * 4096).map(|i| i as u8));

        for i in 0..count {
            let mut record = format!("tileset\\{}\\tile{}.sti", i / 64, i).into_bytes();
            record.resize(256, 0);
            record.extend((data_start + i * 4096).to_le_bytes());
            record.extend(4096u32.to_le_bytes());
            record.resize(280, 0);
            out.extend(record);
        }
        out
    }

    #[divan::bench]
    fn open(bencher: Bencher) {
        bencher.with_inputs(get_input).bench_refs(|data| {
            divan::black_box(SlfArchive::new(Cursor::new(data)).unwrap());
        });
    }

    #[divan::bench]
    fn find(bencher: Bencher) {
        bencher
            .with_inputs(|| SlfArchive::new(Cursor::new(get_input())).unwrap())
            .bench_refs(|slf| {
                divan::black_box(slf.find("TILESET\\7\\TILE500.STI").unwrap());
            });
    }

    #[divan::bench(sample_count = 1)]
    fn read_file_all(bencher: Bencher) {
        let mut slf = SlfArchive::new(Cursor::new(get_input())).unwrap();

        bencher.bench_local(move || {
            let mut buffer = Vec::new();
            for i in 0..slf.len() {
                let mut file = slf.by_index(i).unwrap();
                file.read_to_end(&mut buffer).unwrap();
                buffer.clear();
            }
        });
    }
}
