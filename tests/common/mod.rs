//! Synthetic fixture builders shared by the integration tests.

#![allow(dead_code)]

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A Nitro envelope around `records`.
pub fn envelope(magic: &[u8; 4], records: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
    let body: usize = records.iter().map(|(_, p)| 8 + p.len()).sum();
    let mut out = Vec::new();
    out.extend(magic);
    out.extend(0xFEFFu16.to_le_bytes());
    out.extend(0x0100u16.to_le_bytes());
    out.extend(((0x10 + body) as u32).to_le_bytes());
    out.extend(0x10u16.to_le_bytes());
    out.extend((records.len() as u16).to_le_bytes());
    for (m, p) in records {
        out.extend(*m);
        out.extend(((p.len() + 8) as u32).to_le_bytes());
        out.extend(*p);
    }
    out
}

/// A name table with only an empty root directory.
pub fn empty_names() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(8u32.to_le_bytes());
    out.extend(0u16.to_le_bytes());
    out.extend(1u16.to_le_bytes());
    out.push(0);
    out
}

/// A name table with `root` files at the top level and `sub` files inside
/// directory `dir`, numbered after the root files.
pub fn names(root: &[&str], dir: &str, sub: &[&str]) -> Vec<u8> {
    let mut root_list = Vec::new();
    for n in root {
        root_list.push(n.len() as u8);
        root_list.extend(n.as_bytes());
    }
    root_list.push(0x80 | dir.len() as u8);
    root_list.extend(dir.as_bytes());
    root_list.extend(0xF001u16.to_le_bytes());
    root_list.push(0);

    let mut sub_list = Vec::new();
    for n in sub {
        sub_list.push(n.len() as u8);
        sub_list.extend(n.as_bytes());
    }
    sub_list.push(0);

    let mut out = Vec::new();
    out.extend(16u32.to_le_bytes());
    out.extend(0u16.to_le_bytes());
    out.extend(2u16.to_le_bytes());
    out.extend((16 + root_list.len() as u32).to_le_bytes());
    out.extend((root.len() as u16).to_le_bytes());
    out.extend(0xF000u16.to_le_bytes());
    out.extend(root_list);
    out.extend(sub_list);
    out
}

pub fn narc(files: &[&[u8]]) -> Vec<u8> {
    let mut fat = Vec::new();
    fat.extend((files.len() as u16).to_le_bytes());
    fat.extend(0u16.to_le_bytes());
    let mut data = Vec::new();
    for f in files {
        fat.extend((data.len() as u32).to_le_bytes());
        data.extend(*f);
        fat.extend((data.len() as u32).to_le_bytes());
        while data.len() % 4 != 0 {
            data.push(0);
        }
    }
    envelope(
        b"NARC",
        &[(b"BTAF", &fat), (b"BTNF", &empty_names()), (b"GMIF", &data)],
    )
}

pub fn nclr(colors: &[u16]) -> Vec<u8> {
    let mut ttlp = Vec::new();
    ttlp.extend(3u32.to_le_bytes());
    ttlp.extend(0u32.to_le_bytes());
    ttlp.extend(32u32.to_le_bytes());
    ttlp.extend(0x10u32.to_le_bytes());
    for i in 0..16 {
        ttlp.extend(colors.get(i).copied().unwrap_or(0).to_le_bytes());
    }
    envelope(b"RLCN", &[(b"TTLP", &ttlp)])
}

pub fn ncgr(pixels: &[u8]) -> Vec<u8> {
    let mut rahc = Vec::new();
    rahc.extend(0u16.to_le_bytes());
    rahc.extend(0u16.to_le_bytes());
    rahc.extend(3u32.to_le_bytes());
    rahc.extend(0u64.to_le_bytes());
    rahc.extend((pixels.len() as u32).to_le_bytes());
    rahc.extend(0x18u32.to_le_bytes());
    rahc.extend(pixels);
    envelope(b"RGCN", &[(b"RAHC", &rahc)])
}

/// Mask `words` with the sprite generator, keeping word 0 as the seed.
pub fn mask_sprite(words: &[u16], multiplier: u16, increment: u16) -> Vec<u8> {
    let mut out = Vec::new();
    let mut mask = words.first().copied().unwrap_or(0);
    for (k, &w) in words.iter().enumerate() {
        if k == 0 {
            out.extend(w.to_le_bytes());
            continue;
        }
        mask = mask.wrapping_mul(multiplier).wrapping_add(increment);
        out.extend((w ^ mask).to_le_bytes());
    }
    out
}

/// A masked text block holding `strings` of raw code units.
pub fn text_block(strings: &[Vec<u16>], key: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend((strings.len() as u16).to_le_bytes());
    out.extend(key.to_le_bytes());
    let base = key.wrapping_mul(0x02FD);
    let mut offset = (4 + 8 * strings.len()) as u32;
    let mut body = Vec::new();
    for (i, s) in strings.iter().enumerate() {
        let k16 = base.wrapping_mul(i as u16 + 1);
        let k32 = u32::from(k16) | (u32::from(k16) << 16);
        out.extend((offset ^ k32).to_le_bytes());
        out.extend((s.len() as u32 ^ k32).to_le_bytes());
        let mut ck = ((i as u32 + 1).wrapping_mul(0x91BD3) & 0xFFFF) as u16;
        for &u in s {
            body.extend((u ^ ck).to_le_bytes());
            ck = ck.wrapping_add(0x493D);
        }
        offset += 2 * s.len() as u32;
    }
    out.extend(body);
    out
}

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

/// A ROM image without a banner holding `files` under the name table
/// `fnt`.
pub fn rom(fnt: &[u8], files: &[&[u8]]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x200];
    rom[..4].copy_from_slice(b"DEMO");
    rom[0x0C..0x10].copy_from_slice(b"ADMJ");
    let fnt_offset = rom.len();
    rom.extend(fnt);
    let fat_offset = rom.len();
    rom.extend(vec![0u8; 8 * files.len()]);
    for (i, f) in files.iter().enumerate() {
        while rom.len() % 0x10 != 0 {
            rom.push(0xFF);
        }
        let start = rom.len() as u32;
        rom.extend(*f);
        put_u32(&mut rom, fat_offset + 8 * i, start);
        let end = rom.len() as u32;
        put_u32(&mut rom, fat_offset + 8 * i + 4, end);
    }
    put_u32(&mut rom, 0x40, fnt_offset as u32);
    put_u32(&mut rom, 0x44, fnt.len() as u32);
    put_u32(&mut rom, 0x48, fat_offset as u32);
    put_u32(&mut rom, 0x4C, 8 * files.len() as u32);
    rom
}
